use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors that reach the HTTP surface. Storage failures never appear here:
/// the stores absorb them and degrade (empty day on read, dropped write).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    /// Non-success status from the analysis backend; the original status
    /// code and error detail are passed through to the client.
    #[error("analysis backend returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Upstream { status, detail } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                "Analysis backend error".to_string(),
                Some(detail),
            ),
            ApiError::Network(msg) => (
                StatusCode::BAD_GATEWAY,
                "Could not reach the analysis backend. Please try again.".to_string(),
                Some(msg),
            ),
            ApiError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "error": message });
        if let Some(details) = details {
            body["details"] = json!(details);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let resp = ApiError::InvalidInput("empty input".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_status_is_passed_through() {
        let resp = ApiError::Upstream {
            status: 429,
            detail: "rate limited".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn bogus_upstream_status_falls_back_to_bad_gateway() {
        let resp = ApiError::Upstream {
            status: 0,
            detail: "?".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
