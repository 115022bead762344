//! Record encoder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

/// Computes the hex checksum of an encoded payload.
///
/// The digest covers the base64 text, not the raw blob, so a reader can
/// verify a record without decoding it first.
pub fn checksum(payload: &str) -> String {
    hex::encode(Sha1::digest(payload.as_bytes()))
}

/// Encodes a blob into a record: `checksum || base64(blob)`.
///
/// # Example
///
/// ```
/// use redpaste_codec::{encode, CHECKSUM_LEN};
///
/// let record = encode(b"hello");
/// assert_eq!(&record[CHECKSUM_LEN..], "aGVsbG8=");
/// ```
pub fn encode(blob: &[u8]) -> String {
    let payload = STANDARD.encode(blob);
    let mut record = checksum(&payload);
    record.push_str(&payload);
    record
}
