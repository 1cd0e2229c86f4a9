use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::cache::credential_cache::TokenSource;
use crate::config::settings::ServerConfig;
use crate::server::server::AppState;
use crate::utils::constants::HEALTH_PATH;

static BEARER_MSG: &str = "Bearer";

/// HTTP caller of the token source: serves the current token to processes
/// that cannot link the library.
#[derive(Clone)]
pub struct SinkHttpState {
    source: TokenSource,
    token_path: String,
    read_timeout: Duration,
}

impl SinkHttpState {
    pub fn new(server: &ServerConfig, source: TokenSource) -> Self {
        Self {
            source,
            token_path: server.token_path.clone(),
            read_timeout: Duration::from_millis(server.read_timeout_ms),
        }
    }

    pub fn router(&self) -> Router<AppState> {
        info!("served path: {}", &self.token_path);
        Router::new()
            .route(&self.token_path, get(handle_token))
            .route(HEALTH_PATH, get(handle_health))
    }
}

async fn handle_token(State(state): State<AppState>) -> Response {
    let sink = &state.sink_http_state;
    match sink.source.current_timeout(sink.read_timeout).await {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({ "access_token": token, "token_type": BEARER_MSG })),
        )
            .into_response(),
        Err(err) => {
            warn!(reason = err.reason(), "token request failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": err.to_string(), "kind": err.reason() })),
            )
                .into_response()
        }
    }
}

async fn handle_health(State(state): State<AppState>) -> Response {
    let sink = &state.sink_http_state;
    match sink.source.current_timeout(sink.read_timeout).await {
        Ok(_) => (StatusCode::OK, "ok").into_response(),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response(),
    }
}
