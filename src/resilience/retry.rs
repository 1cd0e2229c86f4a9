use tokio::time::Duration;

use crate::config::settings::RetryConfig;
use crate::utils::constants::{DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS};

/// Delay schedule for a streak of failed fetches.
///
/// The first failure of a streak is retried immediately. From the second
/// failure on the delay starts at `base_delay_ms` and doubles until
/// `max_delay_ms`. A base of zero keeps every retry immediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetrySettings {
    pub fn from_config(retry: &Option<RetryConfig>) -> Self {
        Self {
            base_delay_ms: retry
                .as_ref()
                .and_then(|r| r.base_delay_ms)
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay_ms: retry
                .as_ref()
                .and_then(|r| r.max_delay_ms)
                .unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }

    /// Delay before the next attempt after `failures` consecutive failures.
    pub fn delay_after(&self, failures: u32) -> Duration {
        if failures <= 1 || self.base_delay_ms == 0 {
            return Duration::ZERO;
        }
        let exponent = (failures - 2).min(32);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms.max(self.base_delay_ms));
        Duration::from_millis(delay)
    }
}
