pub mod credential;
pub mod credential_cache;
pub mod error;
