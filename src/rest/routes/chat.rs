// rest/routes/chat.rs — Chat turn route.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::chat::{ChatRequest, ChatResponse};
use crate::observability::LatencyTracker;
use crate::rest::error::ApiError;
use crate::AppContext;

/// POST /api/v1/{user_id}/chat: run one chat turn for the caller.
///
/// The path segment is the verified identity for the whole turn; nothing
/// in the body or in agent output can widen it.
pub async fn chat_turn(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    // Shape problems are rejected before any transaction opens.
    body.validate().map_err(ApiError::InvalidRequest)?;

    let tracker = LatencyTracker::start("chat.turn");
    let outcome = ctx.orchestrator.run_turn(&user_id, &body).await;
    tracker.finish();

    Ok(Json(outcome?))
}
