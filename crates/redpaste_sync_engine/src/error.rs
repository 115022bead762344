//! Error types for the sync engine.

use redpaste_codec::CodecError;
use redpaste_store::StoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// None of these are retried by the engine. Every error ends the loop that
/// produced it.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Talking to the store failed.
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    /// The stored record failed verification or decoding.
    #[error("invalid record: {0}")]
    Codec(#[from] CodecError),

    /// The key does not hold a record.
    #[error("key {key:?} holds no record")]
    EmptyRecord {
        /// The key that was read.
        key: String,
    },

    /// Reading, writing or creating the local file failed.
    #[error("local file {}: {source}", .path.display())]
    LocalIo {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The editor process could not be started.
    #[error("unable to launch editor {editor:?}: {source}")]
    EditorLaunch {
        /// The editor program.
        editor: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No editor is configured in the environment.
    #[error("no editor configured: set $EDITOR or $VISUAL")]
    NoEditor,

    /// The filesystem watcher failed.
    #[error("file watcher error: {0}")]
    Watch(String),

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Classification of errors for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection or I/O failure talking to the store.
    StoreUnavailable,
    /// Checksum mismatch.
    Integrity,
    /// Malformed or missing stored payload.
    Encoding,
    /// Local file could not be read, written or created.
    LocalIo,
    /// The editor could not be launched or supervised.
    ChildProcess,
    /// Filesystem notifications failed.
    Watch,
    /// Configuration was rejected before the engine started.
    Configuration,
}

impl SyncError {
    /// Creates a local I/O error for `path`.
    pub fn local_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Store(_) => ErrorKind::StoreUnavailable,
            SyncError::Codec(e) if e.is_integrity() => ErrorKind::Integrity,
            SyncError::Codec(_) | SyncError::EmptyRecord { .. } => ErrorKind::Encoding,
            SyncError::LocalIo { .. } => ErrorKind::LocalIo,
            SyncError::EditorLaunch { .. } | SyncError::Task(_) => ErrorKind::ChildProcess,
            SyncError::Watch(_) => ErrorKind::Watch,
            SyncError::NoEditor | SyncError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Returns true if this error is a checksum mismatch.
    pub fn is_integrity(&self) -> bool {
        self.kind() == ErrorKind::Integrity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        let integrity = SyncError::Codec(CodecError::ChecksumMismatch {
            expected: "a".into(),
            actual: "b".into(),
        });
        assert_eq!(integrity.kind(), ErrorKind::Integrity);
        assert!(integrity.is_integrity());

        let encoding = SyncError::Codec(CodecError::invalid_base64("bad"));
        assert_eq!(encoding.kind(), ErrorKind::Encoding);

        let store = SyncError::Store(StoreError::Connection("refused".into()));
        assert_eq!(store.kind(), ErrorKind::StoreUnavailable);

        assert_eq!(SyncError::NoEditor.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn error_display() {
        let err = SyncError::local_io(
            "/tmp/clip.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/clip.txt"));
        assert!(message.contains("denied"));

        let err = SyncError::EmptyRecord { key: "clip".into() };
        assert_eq!(err.to_string(), "key \"clip\" holds no record");
    }
}
