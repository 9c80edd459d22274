use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AnalyzeRequest, AnalyzeResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}

#[instrument(skip_all)]
async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let analysis = state
        .analysis
        .analyze(&req.user_input, &req.conversation_history, &req.user_profile)
        .await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}
