//! Error types for the API client.

use si_protocol::ConfigError;
use thiserror::Error;

/// Client operation result type.
pub type Result<T> = std::result::Result<T, ClientError>;

/// API client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The identity check (`/whoami`) was rejected.
    #[error("Authentication failed: {status} - {body}")]
    Authentication { status: u16, body: String },

    /// Operation attempted in a state that cannot serve it (no change set).
    #[error("{operation}: {reason}")]
    Precondition {
        operation: &'static str,
        reason: &'static str,
    },

    /// Any non-success response on a data operation.
    #[error("Failed to {operation}: {status} - {body}")]
    Request {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// A success response whose body did not have the expected shape.
    #[error("Invalid response for {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid client configuration: {0}")]
    Config(#[from] ConfigError),
}

const NO_CHANGE_SET_REASON: &str = "change set must be created first";

impl ClientError {
    /// The standard precondition failure for scoped operations.
    pub fn no_change_set(operation: &'static str) -> Self {
        Self::Precondition {
            operation,
            reason: NO_CHANGE_SET_REASON,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, ClientError::Precondition { .. })
    }

    /// A scoped operation ran before any change set was selected.
    pub fn is_missing_change_set(&self) -> bool {
        matches!(self, ClientError::Precondition { reason, .. } if *reason == NO_CHANGE_SET_REASON)
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Authentication { status, .. } | ClientError::Request { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
