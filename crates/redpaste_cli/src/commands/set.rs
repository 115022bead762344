//! Set command implementation.

use crate::error::{CliError, CliResult};
use redpaste_store::KeyValueStore;
use redpaste_sync_engine::SyncEngine;
use std::io::Read;
use tracing::info;

/// Reads `input` to the end and stores it.
pub fn run<S: KeyValueStore, R: Read>(engine: &SyncEngine<S>, mut input: R) -> CliResult<()> {
    let mut blob = Vec::new();
    input
        .read_to_end(&mut blob)
        .map_err(|e| CliError::io("unable to read stdin", e))?;

    engine.put(&blob)?;
    info!(key = %engine.config().key, bytes = blob.len(), "stored");
    Ok(())
}
