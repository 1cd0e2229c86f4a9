use std::future::Future;

use anyhow::{anyhow, Result};
use axum::Router;
use tracing::info;

use crate::cache::credential_cache::TokenSource;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::sinks::sink_http::SinkHttpState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub sink_http_state: SinkHttpState
}

impl AppState {
    pub fn new (
        metrics: &Metrics,
        settings_config: &SettingsConfig,
        source: TokenSource,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            sink_http_state: SinkHttpState::new(&settings_config.server, source),
        }
    }
}

/// Token, health and (optionally) metrics routes.
pub async fn router(settings_config: &SettingsConfig, source: TokenSource) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, settings_config, source);

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.sink_http_state.router())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start(
    settings_config: &SettingsConfig,
    source: TokenSource,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(settings_config, source).await;

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind '{}': {}", bind_addr, e))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    metrics.up.set(0);

    served.map_err(|e| anyhow!("http server failed: {}", e))
}
