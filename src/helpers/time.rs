use chrono::Utc;
use tokio::time::{Duration, Instant};

/// renewals are never scheduled further out than this
const MAX_RENEWAL_DELAY: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Share of the token lifetime to wait before renewing, e.g. 90% of `ttl`.
pub fn renewal_delay(ttl: Duration, ratio_percent: u32) -> Duration {
    ttl.checked_mul(ratio_percent)
        .map(|d| d / 100)
        .unwrap_or(MAX_RENEWAL_DELAY)
        .min(MAX_RENEWAL_DELAY)
}

pub fn deadline_after(from: Instant, delay: Duration) -> Instant {
    from.checked_add(delay)
        .unwrap_or_else(|| from + MAX_RENEWAL_DELAY)
}

/// Wall clock unix timestamp `ttl` from now, for metrics and logs.
pub fn unix_ts_after(ttl: Duration) -> i64 {
    now_i64().saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}
