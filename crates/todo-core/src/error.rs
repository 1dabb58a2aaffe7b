//! Error Types
//!
//! One enum per layer. `Display` strings are what the UI shows.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure of a remote data call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{message} (status {status})")]
    Backend { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

/// Failure of an auth call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AuthError::Decode(e.to_string())
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

/// Invalid build-time configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
    #[error("invalid SUPABASE_URL `{0}`: {1}")]
    InvalidUrl(String, String),
    #[error("unknown auth mode `{0}` (expected `required` or `anonymous`)")]
    UnknownAuthMode(String),
}

/// Failure recorded by the synchronization flow
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed todo row: {0}")]
    MalformedRow(String),
}
