//! # Redpaste Sync Engine
//!
//! Keeps a local file and a single Redis key in step.
//!
//! This crate provides:
//! - `put` / `get` of a verified record at the configured key
//! - A polling `watch` loop that mirrors remote changes into a file
//! - An editor session that pushes every save of a file while an external
//!   editor runs
//!
//! ## Architecture
//!
//! [`SyncEngine`] owns the store and configuration and exposes synchronous
//! operations. The two long-running modes are async and run each store call
//! on the blocking pool:
//!
//! 1. [`SyncEngine::watch`] ticks every `watch_interval`, compares the
//!    stored checksum prefix against a [`WatchCursor`] and rewrites the file
//!    on change
//! 2. [`EditorSession`] selects over editor exit and [`FileEvent`]s, giving
//!    editor exit precedence
//!
//! ## Key Invariants
//!
//! - The last writer wins; there is no merge or conflict detection
//! - Every read is verified against its checksum before it is used
//! - No operation is retried; the first error ends the loop

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cursor;
mod editor;
mod engine;
mod error;
mod watcher;

pub use config::{SyncConfig, DEFAULT_KEY, DEFAULT_WATCH_INTERVAL};
pub use cursor::WatchCursor;
pub use editor::{EditorCommand, EditorExit, EditorSession, SessionState, EDITOR_VARS};
pub use engine::{SyncEngine, SyncStats};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use watcher::{FileEvent, FileWatcher, MockWatcher, NotifyWatcher};
