pub mod agent;
pub mod chat;
pub mod config;
pub mod observability;
pub mod rest;
pub mod storage;
pub mod tools;

use std::sync::Arc;

use agent::AgentClient;
use chat::ChatOrchestrator;
use config::AppConfig;
use storage::Storage;
use tools::ToolRegistry;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
    pub registry: Arc<ToolRegistry>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Wire the shared state together. The orchestrator reuses the same
    /// storage handle and registry the routes see.
    pub fn new(
        config: AppConfig,
        storage: Storage,
        registry: Arc<ToolRegistry>,
        agent: Arc<dyn AgentClient>,
    ) -> Self {
        let orchestrator = Arc::new(ChatOrchestrator::new(
            storage.clone(),
            Arc::clone(&registry),
            agent,
        ));
        Self {
            config: Arc::new(config),
            storage,
            registry,
            orchestrator,
            started_at: std::time::Instant::now(),
        }
    }
}
