//! In-memory store for testing.

use crate::backend::{resolve_range, KeyValueStore};
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Slot {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// An in-memory key-value store.
///
/// Behaves like a single Redis database for the two commands redpaste
/// uses, including expiry. Suitable for:
/// - Unit tests
/// - Integration tests of the sync loops
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use redpaste_store::{InMemoryStore, KeyValueStore};
/// use std::time::Duration;
///
/// let store = InMemoryStore::new();
/// store.set_with_ttl("key", "hello world", Duration::ZERO).unwrap();
/// assert_eq!(store.get_range("key", 0, 4).unwrap(), b"hello");
/// assert!(store.get_range("missing", 0, -1).unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
    writes: RwLock<u64>,
    offline: RwLock<bool>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with a raw value already present at `key`.
    ///
    /// Useful for planting corrupted records, including bytes that are not
    /// valid UTF-8.
    #[must_use]
    pub fn with_value(key: &str, value: impl AsRef<[u8]>) -> Self {
        let store = Self::new();
        store.slots.write().insert(
            key.to_string(),
            Slot {
                value: value.as_ref().to_vec(),
                expires_at: None,
            },
        );
        store
    }

    /// Returns the full live value at `key`, if any, lossily decoded.
    pub fn value(&self, key: &str) -> Option<String> {
        self.raw_value(key)
            .map(|value| String::from_utf8_lossy(&value).into_owned())
    }

    /// Returns the full live value at `key` as stored.
    pub fn raw_value(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        self.slots
            .read()
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value.clone())
    }

    /// Returns the remaining time to live of `key`, if it has an expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.slots
            .read()
            .get(key)
            .and_then(|slot| slot.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Replaces the raw value at `key` without counting it as a write.
    pub fn overwrite_raw(&self, key: &str, value: impl AsRef<[u8]>) {
        self.slots.write().insert(
            key.to_string(),
            Slot {
                value: value.as_ref().to_vec(),
                expires_at: None,
            },
        );
    }

    /// Returns the number of successful `set_with_ttl` calls.
    pub fn writes(&self) -> u64 {
        *self.writes.read()
    }

    /// Simulates losing the connection: every command fails while offline.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    fn check_online(&self, command: &'static str) -> StoreResult<()> {
        if *self.offline.read() {
            return Err(StoreError::command(command, "store is offline"));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<u8>> {
        self.check_online("GETRANGE")?;

        let Some(value) = self.raw_value(key) else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(value.len(), start, end) {
            Some((from, to)) => value[from..to].to_vec(),
            None => Vec::new(),
        })
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check_online("SET")?;

        let expires_at = (ttl.as_secs() > 0).then(|| Instant::now() + ttl);
        self.slots.write().insert(
            key.to_string(),
            Slot {
                value: value.as_bytes().to_vec(),
                expires_at,
            },
        );
        *self.writes.write() += 1;
        Ok(())
    }
}
