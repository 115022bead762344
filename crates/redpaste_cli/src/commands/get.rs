//! Get command implementation.

use crate::error::{CliError, CliResult};
use redpaste_store::KeyValueStore;
use redpaste_sync_engine::SyncEngine;
use std::io::Write;

/// Writes the stored blob to `out`.
///
/// The record is verified before the first byte is written, so a failed
/// read leaves `out` untouched.
pub fn run<S: KeyValueStore, W: Write>(engine: &SyncEngine<S>, mut out: W) -> CliResult<()> {
    let blob = engine.get()?;
    out.write_all(&blob)
        .and_then(|()| out.flush())
        .map_err(|e| CliError::io("unable to write stdout", e))
}
