//! Replaying adapter for the `GitRepo` port.

use std::path::Path;

use super::{next_output, replay_result};
use crate::cassette::replayer::SharedReplayer;
use crate::error::PortError;
use crate::ports::git::GitRepo;

/// Serves recorded git answers from a cassette.
pub struct ReplayingGitRepo {
    replayer: SharedReplayer,
}

impl ReplayingGitRepo {
    /// Creates a git repo backed by `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl GitRepo for ReplayingGitRepo {
    fn remote_url(&self, _dir: &Path, _remote: &str) -> Result<String, PortError> {
        replay_result(next_output(&self.replayer, "git", "remote_url")?, "git::remote_url")
    }
}
