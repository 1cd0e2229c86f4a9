use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Identity provider metrics
    pub fetch_requests: IntCounterVec,
    pub fetch_failures: IntCounterVec,
    pub fetch_duration: HistogramVec,
    pub fetch_in_flight: IntGaugeVec,

    // Credential metrics
    pub credential_valid: IntGaugeVec,
    pub failure_streak: IntGaugeVec,
    pub token_expiry_unix: IntGaugeVec,
    pub token_handoffs: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("credentialcache".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Identity provider
            fetch_requests: IntCounterVec::new(Opts::new("fetch_requests_total", "Total fetch attempts by provider"),&["provider"],).unwrap(),
            fetch_failures: IntCounterVec::new(Opts::new("fetch_failures_total", "Fetch failures by reason"),&["provider", "reason"],).unwrap(),
            fetch_duration: HistogramVec::new(HistogramOpts::new("fetch_duration_seconds", "Fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["provider"],).unwrap(),
            fetch_in_flight: IntGaugeVec::new(Opts::new("fetch_in_flight", "Fetches currently in flight (0 or 1)"),&["provider"],).unwrap(),

            // Credential
            credential_valid: IntGaugeVec::new(Opts::new("credential_valid", "1 if the cache holds a token, 0 if it holds an error"),&["provider"],).unwrap(),
            failure_streak: IntGaugeVec::new(Opts::new("failure_streak", "Consecutive failed fetches"),&["provider"],).unwrap(),
            token_expiry_unix: IntGaugeVec::new(Opts::new("token_expiry_unix_seconds", "Token expiry timestamp"),&["provider"],).unwrap(),
            token_handoffs: IntCounterVec::new(Opts::new("token_handoffs_total", "Reads served by the coordinating task"),&["provider", "outcome"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_in_flight.clone())).unwrap();
        reg.register(Box::new(metrics.credential_valid.clone())).unwrap();
        reg.register(Box::new(metrics.failure_streak.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.token_handoffs.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
