use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

const DEFAULT_PORT: u16 = 4380;
const DEFAULT_AGENT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_AGENT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_AGENT_TEMPERATURE: f64 = 0.7;
const DEFAULT_AGENT_MAX_TOKENS: u32 = 1024;
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── Agent section ────────────────────────────────────────────────────────────

/// Agent endpoint configuration (`[agent]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentToml {
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature (default: 0.7).
    pub temperature: f64,
    /// Maximum tokens per agent reply (default: 1024).
    pub max_tokens: u32,
    /// Whole-request timeout in seconds (default: 60).
    pub timeout_secs: u64,
}

impl Default for AgentToml {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AGENT_BASE_URL.to_string(),
            model: DEFAULT_AGENT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: DEFAULT_AGENT_TEMPERATURE,
            max_tokens: DEFAULT_AGENT_MAX_TOKENS,
            timeout_secs: DEFAULT_AGENT_TIMEOUT_SECS,
        }
    }
}

/// Resolved agent settings, api key already read from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub base_url: String,
    pub model: String,
    /// Empty when the key env var is unset; agent calls then fail and the
    /// direct tool endpoints keep working.
    pub api_key: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4380).
    port: Option<u16>,
    /// Bind address for the HTTP server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskchatd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Agent endpoint configuration (`[agent]`).
    agent: Option<AgentToml>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── AppConfig ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Bind address for the HTTP server (TASKCHAT_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub log: String,
    /// Log output format: "pretty" (default) | "json" (structured for Loki/Elasticsearch).
    pub log_format: String,
    /// Agent endpoint settings, key resolved from the environment.
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("TASKCHAT_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("TASKCHAT_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let agent_toml = toml.agent.unwrap_or_default();
        let api_key = std::env::var(&agent_toml.api_key_env)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_default();
        if api_key.is_empty() {
            warn!(
                env = %agent_toml.api_key_env,
                "agent api key not set; chat turns will fail until it is"
            );
        }
        let agent = AgentConfig {
            base_url: agent_toml.base_url,
            model: agent_toml.model,
            api_key,
            temperature: agent_toml.temperature,
            max_tokens: agent_toml.max_tokens,
            timeout_secs: agent_toml.timeout_secs,
        };

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            agent,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskchat
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskchat");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskchat or ~/.local/share/taskchat
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskchat");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskchat");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskchat
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskchat");
        }
    }
    // Fallback
    PathBuf::from(".taskchat")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log, "info");
        assert_eq!(config.agent.model, DEFAULT_AGENT_MODEL);
        assert_eq!(config.agent.timeout_secs, DEFAULT_AGENT_TIMEOUT_SECS);
    }

    #[test]
    fn toml_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
port = 9154
log = "debug"

[agent]
model = "gpt-4o-mini"
max_tokens = 256
"#,
        )
        .unwrap();
        let config = AppConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 9154);
        assert_eq!(config.log, "debug");
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_tokens, 256);
        // Unset agent fields keep their defaults.
        assert_eq!(config.agent.temperature, DEFAULT_AGENT_TEMPERATURE);
    }

    #[test]
    fn cli_beats_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = 9154\n").unwrap();
        let config = AppConfig::new(
            Some(4444),
            Some(dir.path().to_path_buf()),
            Some("trace".into()),
            None,
        );
        assert_eq!(config.port, 4444);
        assert_eq!(config.log, "trace");
    }
}
