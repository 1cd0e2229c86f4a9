use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::credential::{Credential, CredentialState, RenewalPolicy, RenewalSchedule};
use crate::cache::error::CacheError;
use crate::helpers::time::unix_ts_after;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::sources::{FetchError, IdentityProvider};
use crate::utils::constants::READ_QUEUE_CAPACITY;

static TOKEN_MSG: &str = "token";
static ERROR_MSG: &str = "error";

/// One-shot reply slot carried by every read request.
type Reply = oneshot::Sender<Result<String, FetchError>>;

/// Owner of the coordinating task.
///
/// The task performs the first fetch as soon as the cache starts and keeps
/// the credential renewed until [`CredentialCache::shutdown`] is called or
/// the cache is dropped. Readers go through [`TokenSource`] handles.
#[derive(Debug)]
pub struct CredentialCache {
    source: TokenSource,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CredentialCache {
    pub fn start<P: IdentityProvider>(provider: P, policy: RenewalPolicy) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel(READ_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let metrics = get_metrics().await;
            let name = provider.name().to_owned();
            let coordinator = Coordinator {
                provider,
                schedule: RenewalSchedule::new(policy),
                metrics,
            };

            // dropping the cache drops the sender, which also ends the task
            tokio::select! {
                biased;
                _ = shutdown_rx => {
                    info!(provider = %name, "credential cache stopping");
                }
                _ = coordinator.run(requests_rx) => {}
            }
            metrics.credential_valid.with_label_values(&[name.as_str()]).set(0);
            metrics.fetch_in_flight.with_label_values(&[name.as_str()]).set(0);
            debug!(provider = %name, state = CredentialState::Stopped.as_str(), "coordinating task finished");
        });

        Self {
            source: TokenSource { requests: requests_tx },
            shutdown: shutdown_tx,
            task,
        }
    }

    /// A reader handle. Clone it freely; every clone talks to the same task.
    pub fn source(&self) -> TokenSource {
        self.source.clone()
    }

    /// Stop the coordinating task and wait for it. An in-flight fetch is
    /// cancelled. Readers get [`CacheError::Closed`] afterwards.
    pub async fn shutdown(self) {
        let CredentialCache { shutdown, task, .. } = self;
        let _ = shutdown.send(());
        if let Err(err) = task.await {
            warn!("credential cache task ended abnormally: {}", err);
        }
    }
}

/// Reader side of the cache.
#[derive(Debug, Clone)]
pub struct TokenSource {
    requests: mpsc::Sender<Reply>,
}

impl TokenSource {
    /// The token currently held, or the error of the most recent fetch.
    ///
    /// Waits until the coordinating task serves this request, which includes
    /// waiting for the initial fetch and for any renewal in flight.
    pub async fn current(&self) -> Result<String, CacheError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(reply_tx)
            .await
            .map_err(|_| CacheError::Closed)?;
        let handoff = reply_rx.await.map_err(|_| CacheError::Closed)?;
        handoff.map_err(CacheError::from)
    }

    /// Like [`current`](Self::current) but gives up after `wait`.
    pub async fn current_timeout(&self, wait: Duration) -> Result<String, CacheError> {
        tokio::time::timeout(wait, self.current())
            .await
            .map_err(|_| CacheError::Timeout { after: wait })?
    }

    /// Attach the current token to an outbound request as a bearer credential.
    pub async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, CacheError> {
        let token = self.current().await?;
        Ok(request.bearer_auth(token))
    }
}

struct Coordinator<P> {
    provider: P,
    schedule: RenewalSchedule,
    metrics: &'static Arc<Metrics>,
}

impl<P: IdentityProvider> Coordinator<P> {
    /// Sole writer of the credential. Requests queued before the initial
    /// fetch completes are answered with its result.
    async fn run(mut self, mut requests: mpsc::Receiver<Reply>) {
        debug!(
            provider = %self.provider.name(),
            state = CredentialState::Uninitialized.as_str(),
            "initial fetch"
        );
        let mut credential = self.fetch().await;

        loop {
            tokio::select! {
                _ = sleep_until(self.schedule.deadline()) => {
                    credential = self.fetch().await;
                }
                request = requests.recv() => match request {
                    Some(reply) => self.handoff(&credential, reply),
                    None => {
                        debug!(provider = %self.provider.name(), "all token sources dropped");
                        break;
                    }
                }
            }
        }
    }

    async fn fetch(&mut self) -> Credential {
        let name = self.provider.name();
        let metrics = self.metrics;
        let start = Instant::now();

        metrics.fetch_requests.with_label_values(&[name]).inc();
        metrics.fetch_in_flight.with_label_values(&[name]).inc();
        let outcome = self.provider.fetch().await;
        metrics.fetch_in_flight.with_label_values(&[name]).dec();

        let fetched_at = Instant::now();
        metrics
            .fetch_duration
            .with_label_values(&[name])
            .observe(fetched_at.duration_since(start).as_secs_f64());

        let next_in = self.schedule.record(&outcome, fetched_at);
        match &outcome {
            Ok(grant) => {
                info!(
                    provider = %name,
                    valid_for = ?grant.ttl,
                    next_renewal_in = ?next_in,
                    "token fetched"
                );
                metrics.credential_valid.with_label_values(&[name]).set(1);
                metrics
                    .token_expiry_unix
                    .with_label_values(&[name])
                    .set(unix_ts_after(grant.ttl));
            }
            Err(err) => {
                warn!(
                    provider = %name,
                    reason = err.reason(),
                    failures = self.schedule.failures(),
                    next_attempt_in = ?next_in,
                    "token fetch failed: {}",
                    err
                );
                metrics.credential_valid.with_label_values(&[name]).set(0);
                metrics
                    .fetch_failures
                    .with_label_values(&[name, err.reason()])
                    .inc();
            }
        }
        metrics
            .failure_streak
            .with_label_values(&[name])
            .set(i64::from(self.schedule.failures()));

        Credential::from_fetch(outcome, fetched_at)
    }

    fn handoff(&self, credential: &Credential, reply: Reply) {
        let handoff = credential.handoff();
        let outcome = if handoff.is_ok() { TOKEN_MSG } else { ERROR_MSG };
        self.metrics
            .token_handoffs
            .with_label_values(&[self.provider.name(), outcome])
            .inc();
        debug!(
            provider = %self.provider.name(),
            state = credential.state().as_str(),
            expires_in = ?credential.expires_in(Instant::now()),
            "handing off credential"
        );
        // the reader may have stopped waiting
        if reply.send(handoff).is_err() {
            debug!(provider = %self.provider.name(), "reader went away before handoff");
        }
    }
}
