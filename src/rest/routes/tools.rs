// rest/routes/tools.rs — Direct tool invocation routes.

use anyhow::Context;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::error::ApiError;
use crate::AppContext;

/// GET /api/v1/mcp/tools: the full catalogue with input and output schemas.
pub async fn list_tools(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let tools = ctx.registry.list();
    Json(json!({ "tools": tools }))
}

/// POST /api/v1/mcp/tools/{name}: execute one tool outside any chat turn.
///
/// The caller supplies `user_id` in the arguments here; there is no
/// surrounding turn to inject it. Business failures come back in-band with
/// status 200. Only an unknown tool name or an infrastructure fault maps
/// to an HTTP error.
pub async fn invoke_tool(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let Some(tool) = ctx.registry.get(&name) else {
        return Err(ApiError::NotFound(format!("Tool '{name}' not found")));
    };

    // Each invocation gets its own short transaction; a dropped transaction
    // on the error path rolls back automatically.
    let mut tx = ctx.storage.begin().await?;
    let result = tool.execute(&mut tx, &arguments).await?;
    tx.commit().await.context("commit tool invocation")?;

    Ok(Json(result))
}
