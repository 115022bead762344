//! Key-value store trait definition.

use crate::error::StoreResult;
use std::sync::Arc;
use std::time::Duration;

/// A minimal key-value store holding string values.
///
/// Stores are **opaque byte slots**. They do not interpret the records
/// they hold; checksums and encoding belong to the codec.
///
/// # Invariants
///
/// - `get_range` follows Redis `GETRANGE` semantics: `end` is inclusive,
///   negative indices count from the end, and a missing key reads as empty
/// - `set_with_ttl` replaces any previous value unconditionally
/// - A zero TTL means the value never expires
/// - Implementations must be `Send + Sync` so they can be shared with
///   blocking worker threads
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::RedisStore`] - For a Redis server
pub trait KeyValueStore: Send + Sync {
    /// Reads the bytes of the value at `key` between `start` and `end`
    /// (both inclusive).
    ///
    /// The bytes are returned as stored. A range may end inside a multi-byte
    /// character, and a corrupted value need not be UTF-8 at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or rejects the command.
    fn get_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<u8>>;

    /// Sets `key` to `value`, expiring after `ttl` unless `ttl` is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or rejects the command.
    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<u8>> {
        (**self).get_range(key, start, end)
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        (**self).set_with_ttl(key, value, ttl)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<u8>> {
        (**self).get_range(key, start, end)
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        (**self).set_with_ttl(key, value, ttl)
    }
}

/// Resolves a `GETRANGE` window against a value of length `len`.
///
/// Returns the half-open byte range to copy, or `None` when the window is
/// empty.
pub(crate) fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { (len + end).max(0) } else { end.min(len - 1) };
    if start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize + 1))
}
