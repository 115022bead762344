//! Watch command implementation.

use super::runtime;
use crate::error::CliResult;
use redpaste_store::KeyValueStore;
use redpaste_sync_engine::SyncEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Mirrors the stored record into `path` until an error stops it.
pub fn run<S: KeyValueStore + 'static>(engine: Arc<SyncEngine<S>>, path: PathBuf) -> CliResult<()> {
    let result = runtime()?.block_on(Arc::clone(&engine).watch(path));

    let stats = engine.stats();
    debug!(
        polls = stats.polls,
        local_writes = stats.local_writes,
        records_read = stats.records_read,
        last_checksum = stats.last_checksum.as_deref().unwrap_or(""),
        "watch stopped"
    );

    match result? {}
}
