use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::analysis::types::{ChatRole, ParsedMeal};

/// History caps keep the single profile record from growing without bound.
pub const MAX_CONVERSATION_HISTORY: usize = 50;
pub const MAX_MEAL_HISTORY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub favorite_brands: Vec<String>,
    pub common_ingredients: Vec<String>,
    pub allergies: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    /// First-seen portion per ingredient name, e.g. "1 cup".
    pub typical_portion_sizes: HashMap<String, String>,
    pub cooking_methods: Vec<String>,
}

impl UserPreferences {
    /// Harvest durable preferences from a confirmed meal's ingredients:
    /// brands, base ingredient names, first-seen portion sizes, and
    /// cooking methods.
    pub fn learn_from_meal(&mut self, meal: &ParsedMeal) {
        for ingredient in &meal.ingredients {
            if let Some(brand) = &ingredient.brand {
                if !self.favorite_brands.contains(brand) {
                    self.favorite_brands.push(brand.clone());
                }
            }

            let base = ingredient
                .name
                .split('(')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            if !base.is_empty() && !self.common_ingredients.contains(&base) {
                self.common_ingredients.push(base);
            }

            self.typical_portion_sizes
                .entry(ingredient.name.to_lowercase())
                .or_insert_with(|| format!("{} {}", ingredient.amount, ingredient.unit));

            if let Some(preparation) = &ingredient.preparation {
                if !self.cooking_methods.contains(preparation) {
                    self.cooking_methods.push(preparation.clone());
                }
            }
        }
    }
}

/// The single local user's memory: preferences plus bounded histories,
/// persisted as one opaque record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub meal_history: Vec<ParsedMeal>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            preferences: UserPreferences::default(),
            meal_history: Vec::new(),
            conversation_history: Vec::new(),
            last_updated: OffsetDateTime::now_utc(),
        }
    }
}

/// Partial preference update; only the provided lists are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub favorite_brands: Option<Vec<String>>,
    pub common_ingredients: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub typical_portion_sizes: Option<HashMap<String, String>>,
    pub cooking_methods: Option<Vec<String>>,
}

impl PreferencesPatch {
    pub fn apply(&self, prefs: &mut UserPreferences) {
        if let Some(v) = &self.favorite_brands {
            prefs.favorite_brands = v.clone();
        }
        if let Some(v) = &self.common_ingredients {
            prefs.common_ingredients = v.clone();
        }
        if let Some(v) = &self.allergies {
            prefs.allergies = v.clone();
        }
        if let Some(v) = &self.dietary_restrictions {
            prefs.dietary_restrictions = v.clone();
        }
        if let Some(v) = &self.typical_portion_sizes {
            prefs.typical_portion_sizes = v.clone();
        }
        if let Some(v) = &self.cooking_methods {
            prefs.cooking_methods = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{IngredientNutrition, MealIngredient};

    fn meal_with_ingredient(ingredient: MealIngredient) -> ParsedMeal {
        ParsedMeal {
            name: "Test Meal".into(),
            calories: 100.0,
            protein: 10.0,
            carbs: 10.0,
            fats: 2.0,
            confidence: 0.9,
            assumptions: Vec::new(),
            sources: Vec::new(),
            ingredients: vec![ingredient],
        }
    }

    #[test]
    fn learns_brand_ingredient_portion_and_method_once() {
        let ingredient = MealIngredient {
            name: "Greek Yogurt (plain, nonfat)".into(),
            amount: 1.0,
            unit: "cup".into(),
            nutrition: IngredientNutrition::default(),
            brand: Some("Chobani".into()),
            preparation: Some("Chilled".into()),
            inferred: false,
        };
        let meal = meal_with_ingredient(ingredient);

        let mut prefs = UserPreferences::default();
        prefs.learn_from_meal(&meal);
        prefs.learn_from_meal(&meal);

        assert_eq!(prefs.favorite_brands, vec!["Chobani"]);
        assert_eq!(prefs.common_ingredients, vec!["Greek Yogurt"]);
        assert_eq!(
            prefs.typical_portion_sizes["greek yogurt (plain, nonfat)"],
            "1 cup"
        );
        assert_eq!(prefs.cooking_methods, vec!["Chilled"]);
    }

    #[test]
    fn first_seen_portion_size_wins() {
        let mut prefs = UserPreferences::default();
        let first = meal_with_ingredient(MealIngredient {
            name: "Brown Rice".into(),
            amount: 1.0,
            unit: "cup".into(),
            nutrition: IngredientNutrition::default(),
            brand: None,
            preparation: None,
            inferred: false,
        });
        let second = meal_with_ingredient(MealIngredient {
            name: "Brown Rice".into(),
            amount: 2.0,
            unit: "cup".into(),
            nutrition: IngredientNutrition::default(),
            brand: None,
            preparation: None,
            inferred: false,
        });

        prefs.learn_from_meal(&first);
        prefs.learn_from_meal(&second);
        assert_eq!(prefs.typical_portion_sizes["brown rice"], "1 cup");
    }

    #[test]
    fn patch_replaces_only_provided_lists() {
        let mut prefs = UserPreferences {
            favorite_brands: vec!["Dannon".into()],
            allergies: vec!["peanuts".into()],
            ..UserPreferences::default()
        };
        let patch = PreferencesPatch {
            favorite_brands: Some(vec!["Chobani".into()]),
            ..PreferencesPatch::default()
        };
        patch.apply(&mut prefs);
        assert_eq!(prefs.favorite_brands, vec!["Chobani"]);
        assert_eq!(prefs.allergies, vec!["peanuts"]);
    }
}
