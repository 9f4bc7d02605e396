//! Error types for a3s-session

use thiserror::Error;

/// Errors that can occur in the session lifecycle
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed handler registration or cookie construction
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not legal in the current lifecycle state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Lookup of a key that is not present in the session data
    #[error("No such key: {0}")]
    KeyNotFound(String),

    /// A raw session blob could not be decoded
    #[error("Failed to decode session data at byte {offset}: {reason}")]
    Decode {
        offset: usize,
        reason: String,
    },

    /// Value serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A storage handler reported a failure
    #[error("Storage handler failed during '{operation}': {reason}")]
    Handler {
        operation: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Build a handler failure for the given operation
    pub fn handler(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Handler {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
