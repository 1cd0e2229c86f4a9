use anyhow::{anyhow, Result};
use reqwest::Client;
use tokio::time::Duration;
use tracing::debug;

use crate::config::provider::ProviderConfig;
use crate::parser::token_response::parse_token_response;
use crate::sources::{FetchError, Grant, IdentityProvider};
use crate::utils::constants::GRANT_TYPE_CLIENT_CREDENTIALS;

/// OAuth2 client-credentials grant against a token endpoint.
#[derive(Debug, Clone)]
pub struct OAuth2Source {
    pub cfg: ProviderConfig,
    pub client: Client,
    timeout: Duration,
}

impl OAuth2Source {
    pub fn new(cfg: ProviderConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("failed to build HTTP client: {}", e))?;
        Ok(Self::with_client(cfg, client))
    }

    /// Reuse an existing client. The request timeout from `cfg` is still
    /// applied per request.
    pub fn with_client(cfg: ProviderConfig, client: Client) -> Self {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        Self { cfg, client, timeout }
    }

    async fn request_token(&self) -> Result<Grant, FetchError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
            ("client_id", self.cfg.client_id.as_str()),
            ("client_secret", self.cfg.client_secret.as_str()),
        ];
        if let Some(scope) = &self.cfg.scope {
            form.push(("scope", scope.as_str()));
        }

        debug!(provider = %self.cfg.name, url = %self.cfg.token_url, "requesting token");
        let response = self
            .client
            .post(&self.cfg.token_url)
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        parse_token_response(status, &body)
    }
}

impl IdentityProvider for OAuth2Source {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    async fn fetch(&self) -> Result<Grant, FetchError> {
        self.request_token().await
    }
}
