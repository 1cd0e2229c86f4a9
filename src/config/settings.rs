use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_READ_TIMEOUT_MS, DEFAULT_RENEWAL_RATIO_PERCENT, DEFAULT_TOKEN_PATH,
};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    #[serde(default)]
    pub renewal: RenewalConfig,
    pub retry: Option<RetryConfig>,
    pub metrics: MetricsConfig,
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RenewalConfig {
    /// share of the token lifetime after which a new token is fetched.
    /// invariant: 1..=100
    pub ratio_percent: Option<u32>,
}

impl RenewalConfig {
    pub fn ratio_percent(&self) -> u32 {
        self.ratio_percent.unwrap_or(DEFAULT_RENEWAL_RATIO_PERCENT)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// delay before the second retry of a failure streak,
    /// multiplied by 2 on every further failure until max_delay_ms.
    /// 0 disables backoff: every failure is retried immediately
    pub base_delay_ms: Option<u64>,
    /// max delay for retrying
    /// invariant: >= base_delay_ms.
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
    #[serde(default = "default_token_path")]
    pub token_path: String,
    /// how long an HTTP caller waits for the cache before answering 503
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_token_path() -> String {
    DEFAULT_TOKEN_PATH.to_string()
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}
