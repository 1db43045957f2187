use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default bind host.
const DEFAULT_HOST: &str = "localhost";
/// Default bind port.
const DEFAULT_PORT: u16 = 3000;
/// Default n8n REST API base URL.
const DEFAULT_N8N_BASE_URL: &str = "http://localhost:5678/api";
/// Default timeout for upstream API calls (30 seconds).
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
/// Default log level when `RUST_LOG` is unset.
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {}", .0.join(", "))]
    Invalid(Vec<String>),
    #[error("cannot resolve bind address {0}")]
    Bind(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub n8n_base_url: String,
    pub n8n_api_key: String,
    pub upstream_timeout: Duration,
    pub tools_config: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `HOST` (optional, default `localhost`)
    /// - `PORT` (optional, default 3000)
    /// - `N8N_BASE_URL` (optional, default `http://localhost:5678/api`)
    /// - `N8N_API_KEY` (required)
    /// - `N8N_TIMEOUT_SECS` (optional, default 30): max seconds per upstream call
    /// - `MCP_TOOLS_CONFIG` (optional): path to the tool catalog JSON
    /// - `LOG_LEVEL` (optional, default `info`), `LOG_FORMAT=json` for JSON logs
    /// - `LOG_DIR` (optional): also write `combined.log` and `error.log` there
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary lookup.
    /// All problems are collected before failing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut problems = Vec::new();

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => match raw.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => {
                    problems.push("Invalid server port".to_string());
                    DEFAULT_PORT
                }
            },
        };

        let n8n_base_url = get("N8N_BASE_URL").unwrap_or_else(|| DEFAULT_N8N_BASE_URL.to_string());
        match Url::parse(&n8n_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => problems.push("n8n base URL must be an http(s) URL".to_string()),
        }

        let n8n_api_key = get("N8N_API_KEY").unwrap_or_default();
        if n8n_api_key.is_empty() {
            problems.push("n8n API key is required".to_string());
        }

        let upstream_timeout_secs = match get("N8N_TIMEOUT_SECS") {
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    problems.push("N8N_TIMEOUT_SECS must be a positive integer".to_string());
                    DEFAULT_UPSTREAM_TIMEOUT_SECS
                }
            },
        };

        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems));
        }

        Ok(Self {
            host,
            port,
            n8n_base_url,
            n8n_api_key,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            tools_config: get("MCP_TOOLS_CONFIG").map(PathBuf::from),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_json: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }

    /// Resolve `host:port` to the first socket address.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let target = format!("{}:{}", self.host, self.port);
        tokio::net::lookup_host(&target)
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(ConfigError::Bind(target))
    }
}
