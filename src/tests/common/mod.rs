// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::Client;
use tokio::time::{sleep, Duration, Instant};

use crate::config::provider::ProviderConfig;
use crate::config::settings::SettingsConfig;
use crate::sources::{FetchError, Grant, IdentityProvider};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn test_settings() -> SettingsConfig {
    serde_yaml::from_str(
        r#"
retry:
  base_delay_ms: 1000
  max_delay_ms: 60000
server:
  host: 127.0.0.1
  port: "0"
  read_timeout_ms: 500
metrics:
  path: /metrics
  is_enabled: true
logging:
  level: info
  format: compact
"#,
    )
    .expect("test settings")
}

pub fn provider_config(token_url: String, timeout_ms: u64) -> ProviderConfig {
    ProviderConfig {
        name: "mock-idp".to_owned(),
        token_url,
        client_id: "client-id".to_owned(),
        client_secret: "client-secret".to_owned(),
        scope: None,
        timeout_ms,
    }
}

pub fn auth_error(code: u32) -> FetchError {
    FetchError::Auth {
        code,
        error: "invalid_client".to_owned(),
        description: "Client credentials are invalid".to_owned(),
    }
}

/// One scripted provider answer.
#[derive(Debug, Clone)]
pub struct Step {
    pub outcome: Result<Grant, FetchError>,
    pub delay: Duration,
}

impl Step {
    pub fn ok(token: &str, ttl_secs: u64) -> Self {
        Self {
            outcome: Ok(Grant::new(token, Duration::from_secs(ttl_secs))),
            delay: Duration::ZERO,
        }
    }

    pub fn err(err: FetchError) -> Self {
        Self { outcome: Err(err), delay: Duration::ZERO }
    }

    /// Answer only after `delay` has passed.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

enum Script {
    /// plays steps in order, then repeats the last one
    Steps(VecDeque<Step>, Option<Step>),
    /// answers `token-<n>` for the n-th call
    Counting { ttl: Duration, delay: Duration },
}

/// Identity provider double that records every call.
#[derive(Clone)]
pub struct FakeProvider {
    name: String,
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self::with_script(name, Script::Steps(steps.into(), None))
    }

    pub fn counting(name: &str, ttl: Duration, delay: Duration) -> Self {
        Self::with_script(name, Script::Counting { ttl, delay })
    }

    fn with_script(name: &str, script: Script) -> Self {
        Self {
            name: name.to_owned(),
            script: Arc::new(Mutex::new(script)),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len() - 1
        };
        let mut script = self.script.lock().unwrap();
        match &mut *script {
            Script::Steps(steps, last) => {
                if let Some(step) = steps.pop_front() {
                    *last = Some(step.clone());
                    step
                } else {
                    last.clone().expect("fake provider has no steps")
                }
            }
            Script::Counting { ttl, delay } => Step {
                outcome: Ok(Grant::new(format!("token-{}", call_index), *ttl)),
                delay: *delay,
            },
        }
    }
}

impl IdentityProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Grant, FetchError> {
        let step = self.next_step();

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        if !step.delay.is_zero() {
            sleep(step.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        step.outcome
    }
}
