//! CLI command implementations.

pub mod edit;
pub mod get;
pub mod set;
pub mod watch;

use crate::error::{CliError, CliResult};
use tokio::runtime::Runtime;

/// Builds the runtime for the long-running commands.
fn runtime() -> CliResult<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::io("unable to start async runtime", e))
}
