//! Error types for the portal layer.

use serde::Serialize;
use thiserror::Error;

/// Portal error type.
#[derive(Error, Debug)]
pub enum PortalError {
    /// The operation needs a bearer token and the session has none.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A client-side precondition failed before any network call.
    #[error("{0}")]
    Validation(String),

    /// HTTP or network failure.
    #[error("{message}")]
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Message extracted from the response or the transport layer.
        message: String,
    },

    /// An authenticated call was rejected with 401; the session was cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The login response carried no recognizable token field.
    #[error("Login response did not include an access token")]
    MissingToken,

    /// Session storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl PortalError {
    /// Message to show the user, falling back to `fallback` when the error
    /// carries no text of its own.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    /// HTTP status of a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Uniform `{success, data, error}` view of an operation result.
///
/// Call sites that only need one-shot handling (a toast, a CLI print) use this
/// instead of reading the subscribed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}
