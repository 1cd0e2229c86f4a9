//! # Credential Cache Library
//!
//! Keeps one OAuth2 client-credentials access token continuously valid for
//! any number of concurrent callers. A single coordinating task owns the
//! credential: it fetches, renews at 90% of the token lifetime, retries
//! failures with backoff, and hands the current token (or the last fetch
//! error) to each reader on request.
//!
//! Modules:
//! - `cache`: credential state and the coordinating task
//! - `sources`: identity provider contract and OAuth2 client credentials
//! - `parser`: token endpoint response classification
//! - `config`: service configuration, loading and validation
//! - `server`, `sinks`: HTTP surface serving the token

pub mod config;
pub mod cache;
pub mod sources;
pub mod resilience;
pub mod parser;
pub mod observability;
pub mod server;
pub mod sinks;
pub mod helpers;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::credential::RenewalPolicy;
pub use crate::cache::credential_cache::{CredentialCache, TokenSource};
pub use crate::cache::error::CacheError;
pub use crate::config::provider::ServiceConfig;
pub use crate::sources::{FetchError, Grant, IdentityProvider};
