//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    InvalidUrl(String),

    /// Could not establish a connection to the store.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A command sent to the store failed.
    #[error("{command} failed: {message}")]
    Command {
        /// The command that failed (e.g. `GETRANGE`).
        command: &'static str,
        /// Error reported by the client or server.
        message: String,
    },
}

impl StoreError {
    /// Create a command error.
    pub fn command(command: &'static str, message: impl Into<String>) -> Self {
        Self::Command {
            command,
            message: message.into(),
        }
    }
}
