//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;

/// Key used when none is configured.
pub const DEFAULT_KEY: &str = "io.luzifer.redpaste";

/// Poll interval used by `watch` when none is configured.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for sync operations.
///
/// Built once at startup and handed to [`crate::SyncEngine::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Key holding the record.
    pub key: String,
    /// Expiry applied on every write. Zero means never.
    pub ttl: Duration,
    /// Period of the `watch` poll loop.
    pub watch_interval: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ttl: Duration::ZERO,
            watch_interval: DEFAULT_WATCH_INTERVAL,
        }
    }

    /// Sets the expiry applied to written records.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the poll interval for `watch`.
    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    /// Checks the configuration before it reaches the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for an empty key or a zero poll interval.
    pub fn validate(&self) -> SyncResult<()> {
        if self.key.is_empty() {
            return Err(SyncError::Config("key must not be empty".into()));
        }
        if self.watch_interval.is_zero() {
            return Err(SyncError::Config(
                "watch interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}
