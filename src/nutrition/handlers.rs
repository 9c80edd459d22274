use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;
use tracing::instrument;

use crate::analysis::types::ParsedMeal;
use crate::error::ApiError;
use crate::state::AppState;

use super::aggregate::{
    calculate_daily_nutrition, goal_percentage, macro_split, MacroSplit, NutritionGoals,
};
use super::types::{DailyMeals, DailyNutrition, EntryPatch, FoodEntry, MealType};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals/:date", get(get_meals))
        .route("/meals/:date/summary", get(get_summary))
        .route("/meals/:date/:meal_type", post(log_entry))
        .route("/meals/:date/:meal_type/confirm", post(confirm_meal))
        .route(
            "/meals/:date/entries/:id",
            patch(update_entry).delete(remove_entry),
        )
}

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, DATE_FORMAT).map_err(|_| {
        ApiError::InvalidInput(format!("invalid date '{raw}', expected YYYY-MM-DD"))
    })
}

fn parse_meal_type(raw: &str) -> Result<MealType, ApiError> {
    MealType::parse(raw).ok_or_else(|| {
        ApiError::InvalidInput(format!(
            "unknown meal type '{raw}', expected breakfast, lunch, dinner or snacks"
        ))
    })
}

#[instrument(skip(state))]
async fn get_meals(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyMeals>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(state.meals.read(date).await))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailySummary {
    nutrition: DailyNutrition,
    goals: NutritionGoals,
    calorie_goal_pct: f64,
    macro_split: MacroSplit,
}

#[instrument(skip(state))]
async fn get_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = parse_date(&date)?;
    let meals = state.meals.read(date).await;
    let nutrition = calculate_daily_nutrition(&meals);
    let goals = NutritionGoals::default();
    Ok(Json(DailySummary {
        nutrition,
        goals,
        calorie_goal_pct: goal_percentage(nutrition.calories, goals.calories),
        macro_split: macro_split(&nutrition),
    }))
}

#[instrument(skip(state, entry))]
async fn log_entry(
    State(state): State<AppState>,
    Path((date, meal_type)): Path<(String, String)>,
    Json(mut entry): Json<FoodEntry>,
) -> Result<(StatusCode, Json<FoodEntry>), ApiError> {
    let date = parse_date(&date)?;
    let meal_type = parse_meal_type(&meal_type)?;
    if entry.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("entry name must not be empty".into()));
    }
    if entry.id.is_empty() {
        entry.id = FoodEntry::generate_id();
    }
    state.meals.add_entry(date, meal_type, entry.clone()).await;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Logs an accepted analysis suggestion as a regular entry with a fresh id.
#[instrument(skip(state, meal))]
async fn confirm_meal(
    State(state): State<AppState>,
    Path((date, meal_type)): Path<(String, String)>,
    Json(meal): Json<ParsedMeal>,
) -> Result<(StatusCode, Json<FoodEntry>), ApiError> {
    let date = parse_date(&date)?;
    let meal_type = parse_meal_type(&meal_type)?;
    if meal.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("meal name must not be empty".into()));
    }
    let entry = FoodEntry::from_parsed(&meal);
    state.meals.add_entry(date, meal_type, entry.clone()).await;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, patch))]
async fn update_entry(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Json(patch): Json<EntryPatch>,
) -> Result<Json<DailyMeals>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(state.meals.update_entry(date, &id, &patch).await))
}

#[instrument(skip(state))]
async fn remove_entry(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
) -> Result<Json<DailyMeals>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(state.meals.remove_entry(date, &id).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dates_that_are_not_day_precise() {
        assert!(parse_date("2025-03-07").is_ok());
        assert!(parse_date("2025-3-7").is_err());
        assert!(parse_date("2025-03-07T10:00:00Z").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn rejects_unknown_meal_types() {
        assert!(parse_meal_type("dinner").is_ok());
        assert!(parse_meal_type("dessert").is_err());
    }
}
