//! Filesystem notifications for the editor session.
//!
//! Uses the `notify` crate and forwards the events the session cares about
//! over a tokio channel.

use crate::error::{SyncError, SyncResult};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// A change to the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// The file contents were written.
    Written(PathBuf),
    /// The file was created.
    Created(PathBuf),
    /// The file was removed (or replaced by an editor's save).
    Removed(PathBuf),
    /// The watcher reported an error.
    Error(String),
}

impl FileEvent {
    /// Maps a `notify` event to a file event.
    ///
    /// Returns `None` for kinds the session ignores (access, metadata,
    /// renames).
    pub fn from_notify(event: &Event) -> Option<Self> {
        let path = event.paths.first().cloned().unwrap_or_default();
        match event.kind {
            EventKind::Create(_) => Some(FileEvent::Created(path)),
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                Some(FileEvent::Written(path))
            }
            EventKind::Remove(_) => Some(FileEvent::Removed(path)),
            _ => None,
        }
    }
}

/// Subscribes a path for change notifications.
///
/// Events are delivered out of band, on the channel the watcher was built
/// with. Calling `watch` again for the same path re-arms the subscription.
pub trait FileWatcher: Send {
    /// Starts (or restarts) watching `path`.
    fn watch(&mut self, path: &Path) -> SyncResult<()>;
}

/// A [`FileWatcher`] backed by the platform's native notification API.
pub struct NotifyWatcher {
    inner: RecommendedWatcher,
}

impl NotifyWatcher {
    /// Creates a watcher that forwards events to `events`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Watch`] if the platform watcher cannot be created.
    pub fn new(events: UnboundedSender<FileEvent>) -> SyncResult<Self> {
        let inner = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => {
                    trace!(?event, "filesystem event");
                    FileEvent::from_notify(&event)
                }
                Err(e) => Some(FileEvent::Error(e.to_string())),
            };
            if let Some(event) = event {
                // A closed channel means the session is over.
                let _ = events.send(event);
            }
        })
        .map_err(|e| SyncError::Watch(e.to_string()))?;

        Ok(Self { inner })
    }
}

impl FileWatcher for NotifyWatcher {
    fn watch(&mut self, path: &Path) -> SyncResult<()> {
        self.inner
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| SyncError::Watch(format!("{}: {}", path.display(), e)))
    }
}

/// A watcher for testing that records every subscription.
#[derive(Debug, Clone, Default)]
pub struct MockWatcher {
    watched: Arc<Mutex<Vec<PathBuf>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockWatcher {
    /// Creates a new mock watcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every path passed to `watch`, in order.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.watched.lock().clone()
    }

    /// Makes subsequent `watch` calls fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl FileWatcher for MockWatcher {
    fn watch(&mut self, path: &Path) -> SyncResult<()> {
        self.watched.lock().push(path.to_path_buf());
        if *self.fail.lock() {
            return Err(SyncError::Watch("mock watcher failure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind) -> Event {
        Event::new(kind).add_path(PathBuf::from("/tmp/clip.txt"))
    }

    #[test]
    fn maps_write_create_remove() {
        let path = PathBuf::from("/tmp/clip.txt");
        assert_eq!(
            FileEvent::from_notify(&event(EventKind::Modify(ModifyKind::Data(
                DataChange::Content
            )))),
            Some(FileEvent::Written(path.clone()))
        );
        assert_eq!(
            FileEvent::from_notify(&event(EventKind::Create(CreateKind::File))),
            Some(FileEvent::Created(path.clone()))
        );
        assert_eq!(
            FileEvent::from_notify(&event(EventKind::Remove(RemoveKind::File))),
            Some(FileEvent::Removed(path))
        );
    }

    #[test]
    fn ignores_access_and_metadata() {
        assert_eq!(
            FileEvent::from_notify(&event(EventKind::Access(AccessKind::Any))),
            None
        );
        assert_eq!(
            FileEvent::from_notify(&event(EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions
            )))),
            None
        );
    }

    #[test]
    fn mock_watcher_records_paths() {
        let watcher = MockWatcher::new();
        let mut handle = watcher.clone();
        handle.watch(Path::new("/a")).unwrap();
        handle.watch(Path::new("/a")).unwrap();
        assert_eq!(watcher.watched().len(), 2);

        watcher.set_failing(true);
        assert!(handle.watch(Path::new("/a")).is_err());
    }

    #[tokio::test]
    async fn notify_watcher_reports_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.txt");
        std::fs::write(&path, b"").unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = NotifyWatcher::new(tx).unwrap();
        watcher.watch(&path).unwrap();

        std::fs::write(&path, b"changed").unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(FileEvent::Written(_)) | Some(FileEvent::Created(_)) => break true,
                    Some(_) => continue,
                    None => break false,
                }
            }
        })
        .await
        .unwrap();
        assert!(event);
    }

    #[test]
    fn watching_missing_path_fails() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = NotifyWatcher::new(tx).unwrap();
        let err = watcher
            .watch(Path::new("/definitely/not/here/clip.txt"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Watch(_)));
    }
}
