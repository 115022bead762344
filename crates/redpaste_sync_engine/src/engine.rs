//! Sync engine: put, get and the watch loop.

use crate::config::SyncConfig;
use crate::cursor::WatchCursor;
use crate::error::{SyncError, SyncResult};
use parking_lot::RwLock;
use redpaste_codec::{decode_parts, encode, CodecError, CHECKSUM_LEN};
use redpaste_store::KeyValueStore;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Number of records written to the store.
    pub records_written: u64,
    /// Number of records read and verified.
    pub records_read: u64,
    /// Number of watch polls performed.
    pub polls: u64,
    /// Number of times the local file was rewritten by `watch`.
    pub local_writes: u64,
    /// Checksum of the last record written or read.
    pub last_checksum: Option<String>,
}

/// The sync engine reads and writes the record held at one key.
///
/// All store calls are synchronous and unretried. The async loops
/// ([`SyncEngine::watch`], [`crate::EditorSession`]) run them on the
/// blocking pool and await each one before starting the next.
pub struct SyncEngine<S: KeyValueStore> {
    config: SyncConfig,
    store: S,
    stats: RwLock<SyncStats>,
}

impl<S: KeyValueStore> SyncEngine<S> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, store: S) -> Self {
        Self {
            config,
            store,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Encodes `blob` and writes it to the key, replacing any previous value.
    pub fn put(&self, blob: &[u8]) -> SyncResult<()> {
        let record = encode(blob);
        self.store
            .set_with_ttl(&self.config.key, &record, self.config.ttl)?;

        let checksum = &record[..CHECKSUM_LEN];
        debug!(key = %self.config.key, bytes = blob.len(), checksum, "record written");

        let mut stats = self.stats.write();
        stats.records_written += 1;
        stats.last_checksum = Some(checksum.to_string());
        Ok(())
    }

    /// Reads only the checksum prefix of the stored record.
    ///
    /// Returns an empty string when the key is absent. Bytes that are not
    /// UTF-8 are replaced, so a corrupted prefix never matches a real digest.
    pub fn read_checksum(&self) -> SyncResult<String> {
        let prefix = self.read_prefix()?;
        Ok(String::from_utf8_lossy(&prefix).into_owned())
    }

    fn read_prefix(&self) -> SyncResult<Vec<u8>> {
        Ok(self
            .store
            .get_range(&self.config.key, 0, CHECKSUM_LEN as isize - 1)?)
    }

    /// Reads, verifies and decodes the stored record.
    ///
    /// The checksum and payload are fetched with two range reads. A
    /// concurrent write between them shows up as a checksum mismatch, and so
    /// does a record holding bytes that are not UTF-8.
    ///
    /// # Errors
    ///
    /// - [`SyncError::EmptyRecord`] if the key is absent or empty
    /// - [`SyncError::Codec`] on checksum mismatch or bad encoding
    /// - [`SyncError::Store`] if the store cannot be read
    pub fn get(&self) -> SyncResult<Vec<u8>> {
        let prefix = self.read_prefix()?;
        if prefix.is_empty() {
            return Err(SyncError::EmptyRecord {
                key: self.config.key.clone(),
            });
        }
        if prefix.len() < CHECKSUM_LEN {
            return Err(CodecError::Truncated {
                len: prefix.len(),
                min: CHECKSUM_LEN,
            }
            .into());
        }

        let payload = self
            .store
            .get_range(&self.config.key, CHECKSUM_LEN as isize, -1)?;
        let checksum = String::from_utf8_lossy(&prefix).into_owned();
        let blob = decode_parts(&checksum, &String::from_utf8_lossy(&payload))?;

        debug!(key = %self.config.key, bytes = blob.len(), %checksum, "record read");

        let mut stats = self.stats.write();
        stats.records_read += 1;
        stats.last_checksum = Some(checksum);
        Ok(blob)
    }

    /// Runs one iteration of the watch loop.
    ///
    /// Reads the checksum prefix. If it differs from `cursor`, fetches the
    /// full record, overwrites `path` with it and advances the cursor.
    /// Returns whether the file was rewritten.
    ///
    /// A missing key matches the initial cursor, so nothing is written until
    /// a record appears.
    pub fn poll(&self, cursor: &mut WatchCursor, path: &Path) -> SyncResult<bool> {
        let checksum = self.read_checksum()?;
        self.stats.write().polls += 1;

        if cursor.is_current(&checksum) {
            return Ok(false);
        }

        let blob = self.get()?;
        std::fs::write(path, &blob).map_err(|e| SyncError::local_io(path, e))?;
        info!(path = %path.display(), bytes = blob.len(), %checksum, "local copy updated");

        cursor.advance(checksum);
        self.stats.write().local_writes += 1;
        Ok(true)
    }
}

impl<S: KeyValueStore + 'static> SyncEngine<S> {
    /// Mirrors the stored record into `path` until an error occurs.
    ///
    /// Polls every `watch_interval`. Iterations never overlap: the next tick
    /// is awaited only after the previous poll has finished. The loop never
    /// ends on its own; it returns only with the error that stopped it.
    pub async fn watch(self: Arc<Self>, path: PathBuf) -> SyncResult<Infallible> {
        let mut interval = tokio::time::interval(self.config.watch_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cursor = WatchCursor::new();

        info!(
            key = %self.config.key,
            path = %path.display(),
            interval = ?self.config.watch_interval,
            "watching for remote changes"
        );

        loop {
            interval.tick().await;

            let engine = Arc::clone(&self);
            let target = path.clone();
            cursor = run_blocking(move || {
                let mut cursor = cursor;
                engine.poll(&mut cursor, &target)?;
                Ok(cursor)
            })
            .await?;
        }
    }
}

/// Runs a blocking store operation on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> SyncResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SyncResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use redpaste_store::InMemoryStore;
    use std::time::Duration;

    fn engine() -> SyncEngine<InMemoryStore> {
        SyncEngine::new(SyncConfig::new("clip"), InMemoryStore::new())
    }

    #[test]
    fn put_then_get() {
        let engine = engine();
        engine.put(b"hello").unwrap();
        assert_eq!(engine.get().unwrap(), b"hello");

        let stats = engine.stats();
        assert_eq!(stats.records_written, 1);
        assert_eq!(stats.records_read, 1);
        assert_eq!(stats.last_checksum.unwrap().len(), CHECKSUM_LEN);
    }

    #[test]
    fn put_empty_then_get() {
        let engine = engine();
        engine.put(b"").unwrap();
        assert!(engine.get().unwrap().is_empty());
    }

    #[test]
    fn put_applies_ttl() {
        let config = SyncConfig::new("clip").with_ttl(Duration::from_secs(30));
        let engine = SyncEngine::new(config, InMemoryStore::new());
        engine.put(b"expiring").unwrap();
        assert!(engine.store().ttl("clip").is_some());
    }

    #[test]
    fn put_zero_ttl_never_expires() {
        let engine = engine();
        engine.put(b"forever").unwrap();
        assert!(engine.store().ttl("clip").is_none());
    }

    #[test]
    fn put_overwrites_unconditionally() {
        let engine = engine();
        engine.put(b"first").unwrap();
        engine.put(b"second").unwrap();
        assert_eq!(engine.get().unwrap(), b"second");
        assert_eq!(engine.store().writes(), 2);
    }

    #[test]
    fn get_missing_key() {
        let err = engine().get().unwrap_err();
        assert!(matches!(err, SyncError::EmptyRecord { .. }));
    }

    #[test]
    fn get_short_record_is_truncated() {
        let store = InMemoryStore::with_value("clip", "abc");
        let engine = SyncEngine::new(SyncConfig::new("clip"), store);
        let err = engine.get().unwrap_err();
        assert!(matches!(
            err,
            SyncError::Codec(CodecError::Truncated { len: 3, .. })
        ));
    }

    #[test]
    fn get_detects_corrupted_checksum() {
        let record = encode(b"hello");
        let corrupted = format!(
            "{}{}",
            if record.starts_with('f') { "e" } else { "f" },
            &record[1..]
        );
        let store = InMemoryStore::with_value("clip", &corrupted);
        let engine = SyncEngine::new(SyncConfig::new("clip"), store);

        let err = engine.get().unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(engine.stats().records_read, 0);
    }

    #[test]
    fn non_utf8_prefix_is_integrity_error() {
        // A two-byte character straddling the end of the checksum prefix.
        let record = encode(b"hello");
        let mut corrupted = record.as_bytes()[..39].to_vec();
        corrupted.extend_from_slice("é".as_bytes());
        corrupted.extend_from_slice(&record.as_bytes()[40..]);
        let store = InMemoryStore::with_value("clip", &corrupted);
        let engine = SyncEngine::new(SyncConfig::new("clip"), store);

        let err = engine.get().unwrap_err();
        assert!(err.is_integrity(), "unexpected error: {err}");
    }

    #[test]
    fn non_utf8_payload_is_integrity_error() {
        let record = encode(b"hello");
        let mut corrupted = record.into_bytes();
        corrupted.push(0xff);
        let store = InMemoryStore::with_value("clip", &corrupted);
        let engine = SyncEngine::new(SyncConfig::new("clip"), store);

        let err = engine.get().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Integrity);
    }

    #[test]
    fn get_store_failure_is_store_error() {
        let engine = engine();
        engine.put(b"hello").unwrap();
        engine.store().set_offline(true);
        assert!(matches!(engine.get(), Err(SyncError::Store(_))));
    }

    #[test]
    fn read_checksum_is_prefix() {
        let engine = engine();
        assert_eq!(engine.read_checksum().unwrap(), "");

        engine.put(b"hello").unwrap();
        let record = engine.store().value("clip").unwrap();
        assert_eq!(engine.read_checksum().unwrap(), &record[..CHECKSUM_LEN]);
    }

    #[test]
    fn poll_skips_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.txt");
        let engine = engine();
        let mut cursor = WatchCursor::new();

        assert!(!engine.poll(&mut cursor, &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn poll_writes_on_change_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.txt");
        let engine = engine();
        let mut cursor = WatchCursor::new();

        engine.put(b"one").unwrap();
        assert!(engine.poll(&mut cursor, &path).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"one");

        assert!(!engine.poll(&mut cursor, &path).unwrap());
        assert_eq!(engine.stats().polls, 2);
        assert_eq!(engine.stats().local_writes, 1);
    }

    #[test]
    fn poll_write_failure_is_local_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("clip.txt");
        let engine = engine();
        engine.put(b"data").unwrap();

        let mut cursor = WatchCursor::new();
        let err = engine.poll(&mut cursor, &path).unwrap_err();
        assert!(matches!(err, SyncError::LocalIo { .. }));
        // Cursor stays put so a later poll would retry the write.
        assert!(cursor.checksum().is_none());
    }
}
