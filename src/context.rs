//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::live::{
    LiveClock, LiveFileSystem, LiveGitRepo, LiveLocalTracker, LiveShellExecutor,
};
use crate::adapters::recording::{RecordingGitRepo, RecordingLocalTracker, RecordingShellExecutor};
use crate::adapters::replaying::{ReplayingGitRepo, ReplayingLocalTracker, ReplayingShellExecutor};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::{CassetteRecorder, SharedRecorder};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Clock, FileSystem, GitRepo, LocalTracker, ShellExecutor};

/// Bundles all port trait objects into a single context.
///
/// Ports are reference counted so providers can hold on to the shell and
/// git ports for the length of a pass.
pub struct ServiceContext {
    /// Clock for sync timestamps.
    pub clock: Arc<dyn Clock>,
    /// Filesystem for sync state and config files.
    pub fs: Arc<dyn FileSystem>,
    /// Git queries.
    pub git: Arc<dyn GitRepo>,
    /// Subprocess execution (`gh`).
    pub shell: Arc<dyn ShellExecutor>,
    /// The local issue tracker.
    pub tracker: Arc<dyn LocalTracker>,
    recorder: Option<SharedRecorder>,
}

impl ServiceContext {
    /// Creates a context from explicit ports.
    #[must_use]
    pub fn from_ports(
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        git: Arc<dyn GitRepo>,
        shell: Arc<dyn ShellExecutor>,
        tracker: Arc<dyn LocalTracker>,
    ) -> Self {
        Self { clock, fs, git, shell, tracker, recorder: None }
    }

    /// Creates a live context that runs `td_bin` for the local tracker.
    #[must_use]
    pub fn live(td_bin: &str) -> Self {
        let shell: Arc<dyn ShellExecutor> = Arc::new(LiveShellExecutor);
        let tracker = Arc::new(LiveLocalTracker::new(td_bin, Arc::clone(&shell)));
        Self::from_ports(
            Arc::new(LiveClock),
            Arc::new(LiveFileSystem),
            Arc::new(LiveGitRepo),
            shell,
            tracker,
        )
    }

    /// Creates a live context that also records every git, shell and
    /// tracker interaction into a cassette at `path`.
    ///
    /// The cassette is written by [`ServiceContext::finish`].
    #[must_use]
    pub fn recording(td_bin: &str, path: &Path) -> Self {
        let recorder = CassetteRecorder::new(path, "issuesync-session").shared();
        let live_shell: Arc<dyn ShellExecutor> = Arc::new(LiveShellExecutor);
        let live_tracker = Arc::new(LiveLocalTracker::new(td_bin, Arc::clone(&live_shell)));

        let mut ctx = Self::from_ports(
            Arc::new(LiveClock),
            Arc::new(LiveFileSystem),
            Arc::new(RecordingGitRepo::new(Arc::new(LiveGitRepo), Arc::clone(&recorder))),
            Arc::new(RecordingShellExecutor::new(live_shell, Arc::clone(&recorder))),
            Arc::new(RecordingLocalTracker::new(live_tracker, Arc::clone(&recorder))),
        );
        ctx.recorder = Some(recorder);
        ctx
    }

    /// Creates a context whose git, shell and tracker ports replay the
    /// cassette at `path`. Clock and filesystem stay live.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        let replayer = CassetteReplayer::new(&cassette).shared();

        Ok(Self::from_ports(
            Arc::new(LiveClock),
            Arc::new(LiveFileSystem),
            Arc::new(ReplayingGitRepo::new(Arc::clone(&replayer))),
            Arc::new(ReplayingShellExecutor::new(Arc::clone(&replayer))),
            Arc::new(ReplayingLocalTracker::new(replayer)),
        ))
    }

    /// Drops the ports and, when recording, writes the cassette.
    ///
    /// Anything else still holding a port (a provider, say) must be dropped
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(mut self) -> Result<Option<PathBuf>, String> {
        let recorder = self.recorder.take();
        drop(self);
        recorder.map(CassetteRecorder::finish_shared).transpose()
    }
}
