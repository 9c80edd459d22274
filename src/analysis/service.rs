use std::sync::Arc;

use tracing::instrument;

use crate::error::ApiError;

use super::client::AnalysisClient;
use super::parse::parse_model_reply;
use super::prompt::build_nutrition_prompt;
use super::types::{ChatMessage, NutritionAnalysis, ProfileSnapshot};

/// The meal-analysis gateway. Each call is one stateless request/response
/// exchange; continuity comes only from the history the caller re-supplies.
#[derive(Clone)]
pub struct AnalysisService {
    client: Arc<dyn AnalysisClient>,
}

impl AnalysisService {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self { client }
    }

    /// Validates the input, renders the prompt, makes the single backend
    /// call, and decodes the reply. Transport and status failures
    /// propagate; an unparseable reply degrades to plain text.
    #[instrument(skip_all)]
    pub async fn analyze(
        &self,
        user_input: &str,
        history: &[ChatMessage],
        profile: &ProfileSnapshot,
    ) -> Result<NutritionAnalysis, ApiError> {
        let trimmed = user_input.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput(
                "Please provide a food description to analyze".into(),
            ));
        }

        let prompt = build_nutrition_prompt(trimmed, history, profile);
        let reply = self.client.complete(&prompt).await?;
        Ok(parse_model_reply(&reply))
    }
}
