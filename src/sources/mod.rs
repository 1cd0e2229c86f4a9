/// Sources module
///
/// The identity provider contract consumed by the credential cache, and the
/// OAuth2 client-credentials implementation used by the service.
use std::future::Future;
use std::time::Duration;

pub mod error;
pub mod oauth2;

pub use error::FetchError;

/// Successful provider answer: a bearer token and how long it stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub token: String,
    pub ttl: Duration,
}

impl Grant {
    pub fn new(token: impl Into<String>, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            ttl,
        }
    }
}

pub trait IdentityProvider: Send + Sync + 'static {
    /// Label for logs and metrics.
    fn name(&self) -> &str;

    /// Fetch a fresh grant. Implementations bound the call with their own
    /// request timeout and never retry.
    fn fetch(&self) -> impl Future<Output = Result<Grant, FetchError>> + Send;
}
