use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::DEFAULT_PROVIDER_TIMEOUT_MS;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
}

/// ================================
/// Identity provider (OAuth2 client credentials)
/// ================================
#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    /// label used in logs and metrics
    #[serde(default = "default_provider_name")]
    pub name: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

// client_secret must never reach the logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("scope", &self.scope)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_provider_name() -> String {
    "oauth2".to_string()
}

fn default_provider_timeout_ms() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_MS
}
