//! # redpaste codec
//!
//! Checksummed record encoding for redpaste.
//!
//! A blob is stored as a single string:
//!
//! ```text
//! +----------------------------+----------------------+
//! | checksum (40 hex chars)    | base64(blob)         |
//! +----------------------------+----------------------+
//! ```
//!
//! - The payload is standard base64 with padding.
//! - The checksum is the lowercase hex SHA-1 of the payload text.
//! - [`CHECKSUM_LEN`] is fixed. Readers fetch the prefix alone to detect
//!   changes, so it must never change without a migration.
//!
//! ## Usage
//!
//! ```
//! use redpaste_codec::{decode, encode};
//!
//! let record = encode(b"clipboard contents");
//! let blob = decode(&record).unwrap();
//! assert_eq!(blob, b"clipboard contents");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;

pub use decoder::{decode, decode_parts, split_record, verify};
pub use encoder::{checksum, encode};
pub use error::{CodecError, CodecResult};

/// Length of the checksum prefix in characters.
pub const CHECKSUM_LEN: usize = 40;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_text() {
        let record = encode(b"hello");
        assert_eq!(decode(&record).unwrap(), b"hello");
    }

    #[test]
    fn roundtrip_empty() {
        let record = encode(b"");
        assert_eq!(decode(&record).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn roundtrip_binary() {
        let blob: Vec<u8> = (0..=255).collect();
        let record = encode(&blob);
        assert_eq!(decode(&record).unwrap(), blob);
    }

    #[test]
    fn split_and_verify() {
        let record = encode(b"parts");
        let (sum, payload) = split_record(&record).unwrap();
        verify(sum, payload).unwrap();
        assert_eq!(decode_parts(sum, payload).unwrap(), b"parts");
    }
}
