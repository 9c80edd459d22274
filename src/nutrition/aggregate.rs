use serde::Serialize;

use super::types::{DailyMeals, DailyNutrition};

/// Field-wise sum over every entry in all four buckets. Pure and
/// deterministic; an empty day yields all-zero totals.
pub fn calculate_daily_nutrition(meals: &DailyMeals) -> DailyNutrition {
    let mut totals = DailyNutrition::default();
    for entry in meals.entries() {
        totals.calories += entry.calories;
        totals.protein += entry.protein;
        totals.carbs += entry.carbs;
        totals.fats += entry.fats;
        totals.fiber += entry.fiber.unwrap_or(0.0);
        totals.sodium += entry.sodium.unwrap_or(0.0);
        totals.sugar += entry.sugar.unwrap_or(0.0);
        totals.saturated_fat += entry.saturated_fat.unwrap_or(0.0);
        totals.cholesterol += entry.cholesterol.unwrap_or(0.0);
        totals.potassium += entry.potassium.unwrap_or(0.0);
        totals.vitamin_c += entry.vitamin_c.unwrap_or(0.0);
        totals.iron += entry.iron.unwrap_or(0.0);
        totals.calcium += entry.calcium.unwrap_or(0.0);
        totals.vitamin_a += entry.vitamin_a.unwrap_or(0.0);
    }
    totals
}

/// Fixed daily goals. Per-user goals are a possible followup; the dashboard
/// has always used these constants.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sodium: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 250.0,
            fats: 67.0,
            fiber: 25.0,
            sodium: 2300.0,
            sugar: 50.0,
            saturated_fat: 20.0,
        }
    }
}

/// Progress toward a goal, capped at 100%. A zero or negative goal reports
/// 0% rather than dividing by zero.
pub fn goal_percentage(current: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    ((current / goal) * 100.0).min(100.0)
}

/// Share of total calories contributed by each macro (4 kcal/g for protein
/// and carbs, 9 kcal/g for fat).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fats_pct: f64,
}

pub fn macro_split(totals: &DailyNutrition) -> MacroSplit {
    if totals.calories <= 0.0 {
        return MacroSplit::default();
    }
    MacroSplit {
        protein_pct: totals.protein * 4.0 / totals.calories * 100.0,
        carbs_pct: totals.carbs * 4.0 / totals.calories * 100.0,
        fats_pct: totals.fats * 9.0 / totals.calories * 100.0,
    }
}
