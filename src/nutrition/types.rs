use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::types::{MealSource, ParsedMeal};

/// One logged food item. The four macro fields are always present; the
/// extended nutrients are optional and count as zero when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<MealSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl FoodEntry {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Turn a confirmed analysis suggestion into a logged entry with a
    /// fresh id.
    pub fn from_parsed(meal: &ParsedMeal) -> Self {
        Self {
            id: Self::generate_id(),
            name: meal.name.clone(),
            calories: meal.calories,
            protein: meal.protein,
            carbs: meal.carbs,
            fats: meal.fats,
            fiber: None,
            sodium: None,
            sugar: None,
            saturated_fat: None,
            cholesterol: None,
            potassium: None,
            vitamin_c: None,
            iron: None,
            calcium: None,
            vitamin_a: None,
            quantity: None,
            unit: None,
            assumptions: meal.assumptions.clone(),
            sources: meal.sources.clone(),
            confidence: Some(meal.confidence),
        }
    }
}

/// The four fixed categories partitioning a day's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
        }
    }

    pub fn parse(raw: &str) -> Option<MealType> {
        match raw {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snacks" => Some(MealType::Snacks),
            _ => None,
        }
    }
}

/// A day's entries. Entry ids are unique across the union of the four
/// buckets; order within a bucket is logging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMeals {
    #[serde(default)]
    pub breakfast: Vec<FoodEntry>,
    #[serde(default)]
    pub lunch: Vec<FoodEntry>,
    #[serde(default)]
    pub dinner: Vec<FoodEntry>,
    #[serde(default)]
    pub snacks: Vec<FoodEntry>,
}

impl DailyMeals {
    pub fn bucket_mut(&mut self, meal_type: MealType) -> &mut Vec<FoodEntry> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &FoodEntry> {
        self.breakfast
            .iter()
            .chain(&self.lunch)
            .chain(&self.dinner)
            .chain(&self.snacks)
    }

    pub fn entry_count(&self) -> usize {
        self.breakfast.len() + self.lunch.len() + self.dinner.len() + self.snacks.len()
    }
}

/// Element-wise total over a day's entries. Derived on every read, never
/// persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sodium: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
    pub cholesterol: f64,
    pub potassium: f64,
    pub vitamin_c: f64,
    pub iron: f64,
    pub calcium: f64,
    pub vitamin_a: f64,
}

/// Partial update for a stored entry; only the provided fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub sugar: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub cholesterol: Option<f64>,
    pub potassium: Option<f64>,
    pub vitamin_c: Option<f64>,
    pub iron: Option<f64>,
    pub calcium: Option<f64>,
    pub vitamin_a: Option<f64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub assumptions: Option<Vec<String>>,
    pub sources: Option<Vec<MealSource>>,
    pub confidence: Option<f64>,
}

impl EntryPatch {
    pub fn apply(&self, entry: &mut FoodEntry) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(v) = self.calories {
            entry.calories = v;
        }
        if let Some(v) = self.protein {
            entry.protein = v;
        }
        if let Some(v) = self.carbs {
            entry.carbs = v;
        }
        if let Some(v) = self.fats {
            entry.fats = v;
        }
        if let Some(v) = self.fiber {
            entry.fiber = Some(v);
        }
        if let Some(v) = self.sodium {
            entry.sodium = Some(v);
        }
        if let Some(v) = self.sugar {
            entry.sugar = Some(v);
        }
        if let Some(v) = self.saturated_fat {
            entry.saturated_fat = Some(v);
        }
        if let Some(v) = self.cholesterol {
            entry.cholesterol = Some(v);
        }
        if let Some(v) = self.potassium {
            entry.potassium = Some(v);
        }
        if let Some(v) = self.vitamin_c {
            entry.vitamin_c = Some(v);
        }
        if let Some(v) = self.iron {
            entry.iron = Some(v);
        }
        if let Some(v) = self.calcium {
            entry.calcium = Some(v);
        }
        if let Some(v) = self.vitamin_a {
            entry.vitamin_a = Some(v);
        }
        if let Some(v) = self.quantity {
            entry.quantity = Some(v);
        }
        if let Some(unit) = &self.unit {
            entry.unit = Some(unit.clone());
        }
        if let Some(assumptions) = &self.assumptions {
            entry.assumptions = assumptions.clone();
        }
        if let Some(sources) = &self.sources {
            entry.sources = sources.clone();
        }
        if let Some(v) = self.confidence {
            entry.confidence = Some(v);
        }
    }
}

#[cfg(test)]
pub(crate) fn test_entry(id: &str, name: &str, calories: f64) -> FoodEntry {
    FoodEntry {
        id: id.to_string(),
        name: name.to_string(),
        calories,
        protein: 0.0,
        carbs: 0.0,
        fats: 0.0,
        fiber: None,
        sodium: None,
        sugar: None,
        saturated_fat: None,
        cholesterol: None,
        potassium: None,
        vitamin_c: None,
        iron: None,
        calcium: None,
        vitamin_a: None,
        quantity: None,
        unit: None,
        assumptions: Vec::new(),
        sources: Vec::new(),
        confidence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_wire_names_are_camel_case() {
        let mut entry = test_entry("a1", "Oatmeal", 150.0);
        entry.saturated_fat = Some(1.5);
        entry.vitamin_c = Some(2.0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["saturatedFat"], 1.5);
        assert_eq!(json["vitaminC"], 2.0);
        assert!(json.get("fiber").is_none());
    }

    #[test]
    fn meal_type_parses_only_the_four_buckets() {
        assert_eq!(MealType::parse("snacks"), Some(MealType::Snacks));
        assert_eq!(MealType::parse("brunch"), None);
        for meal_type in MealType::ALL {
            assert_eq!(MealType::parse(meal_type.as_str()), Some(meal_type));
        }
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let mut entry = test_entry("a1", "Toast", 80.0);
        entry.fiber = Some(2.0);
        let patch = EntryPatch {
            calories: Some(500.0),
            ..EntryPatch::default()
        };
        patch.apply(&mut entry);
        assert_eq!(entry.calories, 500.0);
        assert_eq!(entry.name, "Toast");
        assert_eq!(entry.fiber, Some(2.0));
    }

    #[test]
    fn from_parsed_carries_provenance_and_assigns_an_id() {
        let meal = crate::analysis::types::ParsedMeal {
            name: "Greek Yogurt Bowl".into(),
            calories: 220.0,
            protein: 20.0,
            carbs: 24.0,
            fats: 5.0,
            confidence: 0.9,
            assumptions: vec!["1 cup (227g) plain nonfat Greek yogurt".into()],
            sources: Vec::new(),
            ingredients: Vec::new(),
        };
        let entry = FoodEntry::from_parsed(&meal);
        assert!(!entry.id.is_empty());
        assert_eq!(entry.calories, 220.0);
        assert_eq!(entry.confidence, Some(0.9));
        assert_eq!(entry.assumptions.len(), 1);
    }
}
