// rest/error.rs — Request-level error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::chat::TurnError;

/// Errors that cross the HTTP boundary.
///
/// Every variant renders as the `{"error": CODE, "message": ...}` envelope.
/// Infrastructure detail never reaches the wire; it is logged where the
/// failure happens.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred.".to_string(),
            ),
        };
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::ConversationNotFound => {
                ApiError::NotFound("Conversation not found".to_string())
            }
            TurnError::Infrastructure(cause) => ApiError::Internal(cause),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_variants() {
        let bad = ApiError::InvalidRequest("message must not be empty".into());
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::NotFound("Conversation not found".into());
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let boom = ApiError::Internal(anyhow::anyhow!("db went away"));
        assert_eq!(
            boom.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn turn_errors_map_to_api_errors() {
        let err: ApiError = TurnError::ConversationNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = TurnError::Infrastructure(anyhow::anyhow!("agent down")).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
