use std::time::Duration;

/// Failure of a single identity provider fetch.
///
/// Cloned into every reader that observes it, so it carries owned strings
/// rather than the transport error itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network: {message}")]
    Network { message: String },

    #[error("no response from identity provider within {after:?}")]
    Timeout { after: Duration },

    #[error("identity provider rejected credentials: {error}: {description} (code {code})")]
    Auth {
        code: u32,
        error: String,
        description: String,
    },

    #[error("malformed token response: {message}")]
    MalformedResponse { message: String },
}

impl FetchError {
    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Auth { .. } => "auth",
            FetchError::MalformedResponse { .. } => "malformed",
        }
    }

    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { after: timeout }
        } else {
            FetchError::Network {
                message: err.to_string(),
            }
        }
    }
}
