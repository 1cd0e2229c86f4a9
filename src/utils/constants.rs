//! Shared constants and invariants

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RENEWAL_RATIO_PERCENT: u32 = 90;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_TOKEN_PATH: &str = "/token";
pub const HEALTH_PATH: &str = "/health";

/// pending reader requests buffered in front of the coordinating task
pub const READ_QUEUE_CAPACITY: usize = 64;

pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
