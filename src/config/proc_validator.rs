//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates:
//!   * renewal ratio bounds
//!   * retry backoff invariants
//!   * server / metrics paths and logging level
//!   * identity provider endpoint and credentials

use reqwest::Url;
use tracing::{error, info};

use crate::config::provider::{ProviderConfig, ServiceConfig};
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::HEALTH_PATH;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_provider(&cfg.provider, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    let ratio = settings.renewal.ratio_percent();
    if ratio == 0 || ratio > 100 {
        errors.push(format!(
            "settings.renewal.ratio_percent ({}) must be in range 1-100",
            ratio
        ));
    }

    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }
    if !settings.server.token_path.starts_with('/') {
        errors.push(format!(
            "settings.server.token_path '{}' must start with '/'",
            settings.server.token_path
        ));
    }
    if settings.server.token_path == HEALTH_PATH {
        errors.push(format!(
            "settings.server.token_path '{}' collides with the health route",
            settings.server.token_path
        ));
    }
    if settings.server.read_timeout_ms == 0 {
        errors.push("settings.server.read_timeout_ms must be > 0".to_string());
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && metrics.path == settings.server.token_path {
        errors.push(format!(
            "settings.metrics.path '{}' collides with settings.server.token_path",
            metrics.path
        ));
    }

    if metrics.is_enabled && metrics.path == HEALTH_PATH {
        errors.push(format!(
            "settings.metrics.path '{}' collides with the health route",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}

/// PROVIDER BASICS
fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    match Url::parse(&provider.token_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "provider.token_url scheme '{}' must be 'http' or 'https'",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "provider.token_url '{}' is not a valid URL: {}",
            provider.token_url, e
        )),
    }

    // credentials usually come from ${ENV}; an unset variable expands to ""
    if provider.client_id.trim().is_empty() {
        errors.push("provider.client_id cannot be empty (check the environment)".to_string());
    }
    if provider.client_secret.trim().is_empty() {
        errors.push("provider.client_secret cannot be empty (check the environment)".to_string());
    }

    if provider.timeout_ms == 0 {
        errors.push("provider.timeout_ms must be > 0".to_string());
    }
}
