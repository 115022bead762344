//! Error types for the command-line front end.

use redpaste_store::StoreError;
use redpaste_sync_engine::SyncError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by the `redpaste` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// A sync operation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The store could not be reached.
    #[error("unable to connect to redis: {0}")]
    Store(#[from] StoreError),

    /// The effective configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A duration setting could not be parsed.
    #[error("invalid duration {value:?} for {setting}: {reason}")]
    InvalidDuration {
        /// Name of the setting.
        setting: &'static str,
        /// The rejected value.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The config file exists but cannot be parsed or written.
    #[error("config file {}: {message}", .path.display())]
    ConfigFile {
        /// The config file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Standard stream or filesystem I/O failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A command failed.
    #[error("{operation} failed: {source}")]
    Failed {
        /// The command that failed.
        operation: &'static str,
        /// Why it failed.
        #[source]
        source: Box<CliError>,
    },
}

impl CliError {
    /// Creates an I/O error with context.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Attributes this error to `operation`.
    pub fn during(self, operation: &'static str) -> Self {
        Self::Failed {
            operation,
            source: Box::new(self),
        }
    }
}
