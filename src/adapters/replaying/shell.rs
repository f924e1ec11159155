//! Replaying adapter for the `ShellExecutor` port.

use std::path::{Path, PathBuf};

use super::{next_output, replay_result};
use crate::cassette::replayer::SharedReplayer;
use crate::error::PortError;
use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Serves recorded process results from a cassette.
pub struct ReplayingShellExecutor {
    replayer: SharedReplayer,
}

impl ReplayingShellExecutor {
    /// Creates an executor backed by `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ShellExecutor for ReplayingShellExecutor {
    fn run(&self, _program: &str, _args: &[String], _dir: &Path) -> Result<ShellOutput, PortError> {
        replay_result(next_output(&self.replayer, "shell", "run")?, "shell::run")
    }

    fn find_program(&self, _program: &str) -> Option<PathBuf> {
        next_output(&self.replayer, "shell", "find_program")
            .ok()
            .and_then(|output| serde_json::from_value::<Option<PathBuf>>(output).ok())
            .flatten()
    }
}
