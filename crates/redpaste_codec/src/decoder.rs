//! Record decoder.

use crate::encoder::checksum;
use crate::error::{CodecError, CodecResult};
use crate::CHECKSUM_LEN;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Splits a record into its checksum prefix and encoded payload.
pub fn split_record(record: &str) -> CodecResult<(&str, &str)> {
    if record.len() < CHECKSUM_LEN || !record.is_char_boundary(CHECKSUM_LEN) {
        return Err(CodecError::Truncated {
            len: record.len(),
            min: CHECKSUM_LEN,
        });
    }
    Ok(record.split_at(CHECKSUM_LEN))
}

/// Verifies that `expected` is the checksum of `payload`.
pub fn verify(expected: &str, payload: &str) -> CodecResult<()> {
    let actual = checksum(payload);
    if actual != expected {
        return Err(CodecError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Verifies and decodes a record that was read as two parts.
///
/// The checksum is checked before any base64 decoding takes place.
pub fn decode_parts(expected: &str, payload: &str) -> CodecResult<Vec<u8>> {
    verify(expected, payload)?;
    STANDARD
        .decode(payload)
        .map_err(|e| CodecError::invalid_base64(e.to_string()))
}

/// Decodes a full record back into the original blob.
///
/// # Errors
///
/// - [`CodecError::Truncated`] if the record is shorter than the checksum
/// - [`CodecError::ChecksumMismatch`] if the checksum does not match
/// - [`CodecError::InvalidBase64`] if the payload cannot be decoded
pub fn decode(record: &str) -> CodecResult<Vec<u8>> {
    let (expected, payload) = split_record(record)?;
    decode_parts(expected, payload)
}
