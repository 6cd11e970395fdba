use std::fmt;

use thiserror::Error;

use super::types::ChannelState;

pub const GENERIC_LOGIN_FAILURE: &str = "Login failed";

/// Rejected locally before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both username and password.")]
    MissingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    Network,
    Server,
    Timeout,
}

/// Login rejected by the server or not completed.
///
/// `message` is the server-provided text when there was one, otherwise
/// [`GENERIC_LOGIN_FAILURE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub reason: AuthFailure,
    pub message: String,
}

impl AuthError {
    pub fn new(reason: AuthFailure, message: Option<String>) -> Self {
        Self {
            reason,
            message: message.unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    Network,
    Server,
    Timeout,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchFailure::Network => "network error",
            FetchFailure::Server => "server error",
            FetchFailure::Timeout => "timed out",
        };
        f.write_str(label)
    }
}

/// Feed page could not be fetched. Always retryable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load page {page}: {reason} ({detail})")]
pub struct FetchError {
    pub page: u32,
    pub reason: FetchFailure,
    pub detail: String,
}

impl FetchError {
    pub fn new(page: u32, reason: FetchFailure, detail: impl Into<String>) -> Self {
        Self {
            page,
            reason,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("handshake timed out")]
    HandshakeTimeout,
    #[error("connection lost: {0}")]
    Connection(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel is not connected (state: {0})")]
    NotConnected(ChannelState),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
