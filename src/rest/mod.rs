// rest/mod.rs — Public REST API server.
//
// Axum HTTP server carrying the chat surface and direct tool access.
//
// Endpoints:
//   POST /api/v1/{user_id}/chat
//   GET  /api/v1/mcp/tools
//   POST /api/v1/mcp/tools/{name}
//   GET  /api/v1/health

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Chat turns
        .route("/api/v1/{user_id}/chat", post(routes::chat::chat_turn))
        // Tool catalogue and direct invocation
        .route("/api/v1/mcp/tools", get(routes::tools::list_tools))
        .route("/api/v1/mcp/tools/{name}", post(routes::tools::invoke_tool))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
