use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use taskchatd::agent::openai::OpenAiAgent;
use taskchatd::config::AppConfig;
use taskchatd::rest;
use taskchatd::storage::Storage;
use taskchatd::tools::ToolRegistry;
use taskchatd::AppContext;

#[derive(Parser)]
#[command(
    name = "taskchatd",
    about = "Chat-driven task manager daemon",
    version
)]
struct Args {
    /// HTTP server port
    #[arg(long, env = "TASKCHAT_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "TASKCHAT_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKCHAT_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKCHAT_BIND")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format =
        std::env::var("TASKCHAT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    setup_logging(&log_level, &log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "taskchatd starting");

    let config = AppConfig::new(args.port, args.data_dir, args.log, args.bind_address);
    info!(
        data_dir = %config.data_dir.display(),
        port = config.port,
        model = %config.agent.model,
        "config loaded"
    );

    let storage = Storage::new(&config.data_dir).await?;
    let registry = Arc::new(ToolRegistry::builtin());
    let agent = Arc::new(OpenAiAgent::new(&config.agent)?);

    let ctx = Arc::new(AppContext::new(config, storage, registry, agent));
    rest::start_rest_server(ctx).await
}

/// Initialize the tracing subscriber.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators like Loki/Elasticsearch).
fn setup_logging(log_level: &str, log_format: &str) {
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .init();
    }
}
