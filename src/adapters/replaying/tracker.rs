//! Replaying adapter for the `LocalTracker` port.

use std::path::Path;

use super::{next_output, replay_result};
use crate::cassette::replayer::SharedReplayer;
use crate::error::PortError;
use crate::model::LocalIssue;
use crate::ports::{IssueChanges, LocalTracker, NewLocalIssue};

/// Serves recorded local tracker results from a cassette.
pub struct ReplayingLocalTracker {
    replayer: SharedReplayer,
}

impl ReplayingLocalTracker {
    /// Creates a tracker backed by `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl LocalTracker for ReplayingLocalTracker {
    fn list(&self, _dir: &Path) -> Result<Vec<LocalIssue>, PortError> {
        replay_result(next_output(&self.replayer, "tracker", "list")?, "tracker::list")
    }

    fn show(&self, _dir: &Path, _id: &str) -> Result<LocalIssue, PortError> {
        replay_result(next_output(&self.replayer, "tracker", "show")?, "tracker::show")
    }

    fn create(&self, _dir: &Path, _issue: &NewLocalIssue) -> Result<String, PortError> {
        replay_result(next_output(&self.replayer, "tracker", "create")?, "tracker::create")
    }

    fn update(&self, _dir: &Path, _id: &str, _changes: &IssueChanges) -> Result<(), PortError> {
        replay_result(next_output(&self.replayer, "tracker", "update")?, "tracker::update")
    }
}
