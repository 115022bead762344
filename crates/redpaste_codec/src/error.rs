//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a stored record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stored checksum does not match the digest of the stored payload.
    ///
    /// Signals corruption or a torn concurrent write. Never repaired.
    #[error("checksum mismatch: stored {expected}, computed {actual}")]
    ChecksumMismatch {
        /// Checksum found in the record.
        expected: String,
        /// Checksum recomputed from the payload.
        actual: String,
    },

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {message}")]
    InvalidBase64 {
        /// Description of the decoding failure.
        message: String,
    },

    /// The record is shorter than the checksum prefix.
    #[error("record truncated: {len} bytes, expected at least {min}")]
    Truncated {
        /// Length of the record that was read.
        len: usize,
        /// Minimum valid length.
        min: usize,
    },
}

impl CodecError {
    /// Returns true if this error is an integrity failure (checksum mismatch).
    pub fn is_integrity(&self) -> bool {
        matches!(self, CodecError::ChecksumMismatch { .. })
    }

    /// Create an invalid base64 error.
    pub fn invalid_base64(message: impl Into<String>) -> Self {
        Self::InvalidBase64 {
            message: message.into(),
        }
    }
}
