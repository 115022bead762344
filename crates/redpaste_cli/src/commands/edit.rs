//! Edit command implementation.

use super::runtime;
use crate::error::CliResult;
use redpaste_store::KeyValueStore;
use redpaste_sync_engine::{EditorCommand, EditorExit, EditorSession, SyncEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens `path` in `editor` and pushes every save until the editor exits.
pub fn run<S: KeyValueStore + 'static>(
    engine: Arc<SyncEngine<S>>,
    path: PathBuf,
    editor: &EditorCommand,
) -> CliResult<EditorExit> {
    let mut session = EditorSession::new(Arc::clone(&engine), path);
    let exit = runtime()?.block_on(session.run(editor))?;

    let stats = engine.stats();
    debug!(
        records_written = stats.records_written,
        last_checksum = stats.last_checksum.as_deref().unwrap_or(""),
        "edit session finished"
    );

    if !exit.success() {
        warn!(code = ?exit.code(), "editor exited unsuccessfully");
    }
    Ok(exit)
}
