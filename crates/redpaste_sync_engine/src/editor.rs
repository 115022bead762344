//! Editor session: edit the record in an external program.
//!
//! The session runs the editor as a child process against a local file and
//! pushes every write of that file to the store while the editor runs.
//!
//! ## Event sources
//!
//! - Editor completion, delivered once on a oneshot channel by a
//!   supervision task
//! - File notifications, delivered on an mpsc channel by a [`FileWatcher`]
//!
//! The session loop selects over both. Editor completion is checked first,
//! so once the editor has exited no further notifications are handled.
//! Pushes run inside the loop body, so at most one is in flight and queued
//! notifications wait their turn.
//!
//! The editor owns the terminal while the session runs. Everything logged
//! before it exits is at `debug` level or below.

use crate::engine::{run_blocking, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::watcher::{FileEvent, FileWatcher, NotifyWatcher};
use redpaste_store::KeyValueStore;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Environment variables consulted for the editor, in order.
pub const EDITOR_VARS: [&str; 2] = ["EDITOR", "VISUAL"];

/// The external editor to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    /// Creates a command for `program` with no extra arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds arguments passed before the file path.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Parses an editor setting such as `"code --wait"`.
    ///
    /// Returns `None` for a blank setting.
    pub fn parse(setting: &str) -> Option<Self> {
        let mut parts = setting.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts))
    }

    /// Resolves the editor from `lookup`, trying each of [`EDITOR_VARS`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoEditor`] if none of the variables is set.
    pub fn resolve<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        EDITOR_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find_map(|setting| Self::parse(&setting))
            .ok_or(SyncError::NoEditor)
    }

    /// Resolves the editor from the process environment.
    pub fn from_env() -> SyncResult<Self> {
        Self::resolve(|var| std::env::var(var).ok())
    }

    /// Returns the program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the extra arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// How the editor process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorExit {
    code: Option<i32>,
}

impl EditorExit {
    /// An exit with the given status code.
    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// An exit whose status is unknown (killed by a signal, or lost).
    pub fn unknown() -> Self {
        Self { code: None }
    }

    /// Builds an exit from a process status.
    pub fn from_status(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }

    /// Returns the raw status code, if one was reported.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns true if the editor exited cleanly.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns the process exit code to report: 0 on success, the editor's
    /// own code when it fits, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self.code {
            Some(0) => 0,
            Some(code) => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
            None => 1,
        }
    }
}

/// Lifecycle of an editor session.
///
/// A session is `Idle` from construction until [`EditorSession::drive`]
/// starts, then `Running` until it reaches one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The session has not started yet.
    Idle,
    /// The editor is running and changes are being pushed.
    Running,
    /// The editor exited. Terminal.
    Exited(EditorExit),
    /// An error aborted the session. Terminal.
    Fatal,
}

impl SessionState {
    /// Returns true if the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Exited(_) | SessionState::Fatal)
    }
}

/// Supervises an editor process and pushes its saves to the store.
pub struct EditorSession<S: KeyValueStore> {
    engine: Arc<SyncEngine<S>>,
    path: PathBuf,
    state: SessionState,
    pushes: u64,
    rearms: u64,
}

impl<S: KeyValueStore + 'static> EditorSession<S> {
    /// Creates a session editing `path`.
    pub fn new(engine: Arc<SyncEngine<S>>, path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            path: path.into(),
            state: SessionState::Idle,
            pushes: 0,
            rearms: 0,
        }
    }

    /// Returns the file being edited.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns how many times the file was pushed to the store.
    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    /// Returns how many times the watcher was re-armed after a removal.
    pub fn rearms(&self) -> u64 {
        self.rearms
    }

    /// Creates the file empty if it does not exist yet.
    pub fn prepare(&self) -> SyncResult<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => {
                debug!(path = %self.path.display(), "created empty file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(SyncError::local_io(&self.path, e)),
        }
    }

    /// Runs a full session: prepare the file, watch it, launch the editor
    /// and push changes until the editor exits.
    ///
    /// # Errors
    ///
    /// Fails before launching on file or watcher errors, with
    /// [`SyncError::EditorLaunch`] if the editor cannot be started, and on
    /// the first read or push error while running.
    pub async fn run(&mut self, editor: &EditorCommand) -> SyncResult<EditorExit> {
        self.prepare()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = NotifyWatcher::new(tx)?;
        watcher.watch(&self.path)?;

        let exit = self.spawn_editor(editor)?;
        self.drive(exit, rx, watcher).await
    }

    /// Launches the editor and returns the channel its exit arrives on.
    fn spawn_editor(&self, editor: &EditorCommand) -> SyncResult<oneshot::Receiver<EditorExit>> {
        let mut child =
            editor
                .command(&self.path)
                .spawn()
                .map_err(|source| SyncError::EditorLaunch {
                    editor: editor.program().to_string(),
                    source,
                })?;

        debug!(editor = editor.program(), path = %self.path.display(), "editor launched");

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => EditorExit::from_status(status),
                Err(e) => {
                    error!(error = %e, "unable to wait for editor");
                    EditorExit::unknown()
                }
            };
            let _ = tx.send(exit);
        });
        Ok(rx)
    }

    /// Runs the session loop over an exit signal and a stream of file events.
    ///
    /// Returns when `exit` fires, or with the first fatal error. Events still
    /// queued when the editor exits are dropped. If the exit sender is
    /// dropped without sending, the exit is reported as unknown.
    pub async fn drive<W: FileWatcher>(
        &mut self,
        exit: oneshot::Receiver<EditorExit>,
        events: mpsc::UnboundedReceiver<FileEvent>,
        mut watcher: W,
    ) -> SyncResult<EditorExit> {
        self.state = SessionState::Running;

        let result = self.event_loop(exit, events, &mut watcher).await;
        self.state = match &result {
            Ok(exit) => {
                info!(code = ?exit.code(), pushes = self.pushes, "editor exited");
                SessionState::Exited(*exit)
            }
            Err(e) => {
                debug!(error = %e, "editor session aborted");
                SessionState::Fatal
            }
        };
        result
    }

    async fn event_loop<W: FileWatcher>(
        &mut self,
        mut exit: oneshot::Receiver<EditorExit>,
        mut events: mpsc::UnboundedReceiver<FileEvent>,
        watcher: &mut W,
    ) -> SyncResult<EditorExit> {
        let mut events_open = true;

        loop {
            tokio::select! {
                biased;

                status = &mut exit => {
                    return Ok(status.unwrap_or_else(|_| {
                        warn!("editor supervisor went away without an exit status");
                        EditorExit::unknown()
                    }));
                }

                event = events.recv(), if events_open => match event {
                    Some(FileEvent::Written(_)) | Some(FileEvent::Created(_)) => {
                        self.push_file().await?;
                    }
                    Some(FileEvent::Removed(_)) => self.rearm(watcher),
                    Some(FileEvent::Error(message)) => return Err(SyncError::Watch(message)),
                    None => {
                        debug!("file event stream closed");
                        events_open = false;
                    }
                },
            }
        }
    }

    /// Reads the file as it is now and writes it to the store.
    async fn push_file(&mut self) -> SyncResult<()> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SyncError::local_io(&self.path, e))?;
        let bytes = data.len();

        let engine = Arc::clone(&self.engine);
        run_blocking(move || engine.put(&data)).await?;

        self.pushes += 1;
        debug!(bytes, "pushed local changes");
        Ok(())
    }

    /// Re-subscribes the file after it was removed.
    ///
    /// Editors that save by replacing the file unlink it first; without this
    /// the subscription would silently end.
    fn rearm<W: FileWatcher>(&mut self, watcher: &mut W) {
        self.rearms += 1;
        match watcher.watch(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "watcher re-armed"),
            Err(e) => debug!(error = %e, "unable to re-arm watcher"),
        }
    }
}
