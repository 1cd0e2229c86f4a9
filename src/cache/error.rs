use std::time::Duration;

use crate::sources::FetchError;

/// What a reader gets back from [`TokenSource`](crate::cache::credential_cache::TokenSource)
/// instead of a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The most recent fetch failed; the cache keeps retrying on its own.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The reader gave up waiting. The coordinating task is unaffected.
    #[error("gave up waiting for the credential cache after {after:?}")]
    Timeout { after: Duration },

    #[error("credential cache is stopped")]
    Closed,
}

impl CacheError {
    /// Short label for logs and HTTP error bodies.
    pub fn reason(&self) -> &'static str {
        match self {
            CacheError::Fetch(err) => err.reason(),
            CacheError::Timeout { .. } => "busy",
            CacheError::Closed => "stopped",
        }
    }
}
