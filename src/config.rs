//! Configuration types for stock-pulse

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub quote: QuoteConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub hub: HubConfig,
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:8000"
    pub bind: String,
}

/// Symbol registry storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// sqlx connection string, e.g. "sqlite://data/stock-pulse.db" or "sqlite::memory:"
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Quote provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuoteConfig {
    pub base_url: String,
    /// HTTP request timeout (seconds)
    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Background refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Run the background refresh loop when serving
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay between the end of one tick and the start of the next (seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound on a single symbol's fetch (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Symbols fetched concurrently within one tick
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

/// Broadcast hub configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubConfig {
    /// Outbound queue length per subscriber before it is dropped
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormatConfig,
    /// Prometheus exporter port, disabled when absent
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatConfig {
    #[default]
    Pretty,
    Json,
}

fn default_true() -> bool {
    true
}
fn default_max_connections() -> u32 {
    5
}
fn default_quote_timeout() -> u64 {
    5
}
fn default_user_agent() -> String {
    concat!("stock-pulse/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_interval_secs() -> u64 {
    10
}
fn default_fetch_timeout_secs() -> u64 {
    8
}
fn default_max_concurrent_fetches() -> usize {
    4
}
fn default_subscriber_capacity() -> usize {
    64
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: default_subscriber_capacity(),
        }
    }
}

impl QuoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Configuration shipped in `config.toml.example`
    pub fn example() -> anyhow::Result<Self> {
        let config: Config = toml::from_str(include_str!("../config.toml.example"))?;
        Ok(config)
    }
}
