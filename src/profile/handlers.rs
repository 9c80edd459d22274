use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::analysis::types::{ChatRole, ParsedMeal};
use crate::error::ApiError;
use crate::state::AppState;

use super::types::{PreferencesPatch, UserProfile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).delete(reset_profile))
        .route("/profile/preferences", put(update_preferences))
        .route("/profile/messages", post(add_message))
        .route("/profile/meals", post(add_meal))
}

#[derive(Debug, Deserialize)]
struct NewMessage {
    role: ChatRole,
    content: String,
}

#[instrument(skip_all)]
async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.profile.get().await)
}

#[instrument(skip_all)]
async fn reset_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.profile.clear().await)
}

#[instrument(skip_all)]
async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Json<UserProfile> {
    Json(state.profile.update_preferences(&patch).await)
}

#[instrument(skip_all)]
async fn add_message(
    State(state): State<AppState>,
    Json(msg): Json<NewMessage>,
) -> Result<Json<UserProfile>, ApiError> {
    if msg.content.trim().is_empty() {
        return Err(ApiError::InvalidInput("Message content is required".into()));
    }
    Ok(Json(state.profile.add_message(msg.role, msg.content).await))
}

#[instrument(skip_all)]
async fn add_meal(
    State(state): State<AppState>,
    Json(meal): Json<ParsedMeal>,
) -> Result<Json<UserProfile>, ApiError> {
    if meal.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Meal name is required".into()));
    }
    Ok(Json(state.profile.add_meal(meal).await))
}
