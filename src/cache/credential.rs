use tokio::time::{Duration, Instant};

use crate::config::settings::SettingsConfig;
use crate::helpers::time::{deadline_after, renewal_delay};
use crate::resilience::retry::RetrySettings;
use crate::sources::{FetchError, Grant};
use crate::utils::constants::DEFAULT_RENEWAL_RATIO_PERCENT;

/// The single authoritative authentication state.
///
/// Either a token with its expiry, or the error of the last fetch. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Valid { token: String, valid_until: Instant },
    Errored(FetchError),
}

impl Credential {
    pub fn from_fetch(outcome: Result<Grant, FetchError>, fetched_at: Instant) -> Self {
        match outcome {
            Ok(grant) => Credential::Valid {
                valid_until: deadline_after(fetched_at, grant.ttl),
                token: grant.token,
            },
            Err(err) => Credential::Errored(err),
        }
    }

    /// Owned copy handed to a single reader.
    pub fn handoff(&self) -> Result<String, FetchError> {
        match self {
            Credential::Valid { token, .. } => Ok(token.clone()),
            Credential::Errored(err) => Err(err.clone()),
        }
    }

    /// Remaining validity of the held token, zero once it has expired.
    /// `None` while an error is held.
    pub fn expires_in(&self, now: Instant) -> Option<Duration> {
        match self {
            Credential::Valid { valid_until, .. } => Some(valid_until.saturating_duration_since(now)),
            Credential::Errored(_) => None,
        }
    }

    pub fn state(&self) -> CredentialState {
        match self {
            Credential::Valid { .. } => CredentialState::Valid,
            Credential::Errored(_) => CredentialState::Errored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Uninitialized,
    Valid,
    Errored,
    Stopped,
}

impl CredentialState {
    pub fn as_str(&self) -> &'static str {
        match *self {
            CredentialState::Uninitialized => "uninitialized",
            CredentialState::Valid => "valid",
            CredentialState::Errored => "errored",
            CredentialState::Stopped => "stopped",
        }
    }
}

/// When to renew: a share of the token lifetime on success, the failure
/// backoff on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalPolicy {
    pub ratio_percent: u32,
    pub retry: RetrySettings,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            ratio_percent: DEFAULT_RENEWAL_RATIO_PERCENT,
            retry: RetrySettings::default(),
        }
    }
}

impl RenewalPolicy {
    pub fn from_settings(settings: &SettingsConfig) -> Self {
        Self {
            ratio_percent: settings.renewal.ratio_percent(),
            retry: RetrySettings::from_config(&settings.retry),
        }
    }
}

/// Renewal deadline bookkeeping, owned by the coordinating task.
#[derive(Debug)]
pub struct RenewalSchedule {
    policy: RenewalPolicy,
    failures: u32,
    deadline: Instant,
}

impl RenewalSchedule {
    pub fn new(policy: RenewalPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            deadline: Instant::now(),
        }
    }

    /// Recompute the deadline from the latest attempt. Returns the delay
    /// until the next attempt.
    pub fn record(&mut self, outcome: &Result<Grant, FetchError>, fetched_at: Instant) -> Duration {
        let delay = match outcome {
            Ok(grant) => {
                self.failures = 0;
                renewal_delay(grant.ttl, self.policy.ratio_percent)
            }
            Err(_) => {
                self.failures = self.failures.saturating_add(1);
                self.policy.retry.delay_after(self.failures)
            }
        };
        self.deadline = deadline_after(fetched_at, delay);
        delay
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Consecutive failed fetches since the last success.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
