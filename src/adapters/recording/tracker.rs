//! Recording adapter for the `LocalTracker` port.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::SharedRecorder;
use crate::error::PortError;
use crate::model::LocalIssue;
use crate::ports::{IssueChanges, LocalTracker, NewLocalIssue};

/// Records local tracker calls while delegating to an inner tracker.
pub struct RecordingLocalTracker {
    inner: Arc<dyn LocalTracker>,
    recorder: SharedRecorder,
}

impl RecordingLocalTracker {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn LocalTracker>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct IdInput<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct UpdateInput<'a> {
    id: &'a str,
    changes: &'a IssueChanges,
}

impl LocalTracker for RecordingLocalTracker {
    fn list(&self, dir: &Path) -> Result<Vec<LocalIssue>, PortError> {
        let result = self.inner.list(dir);
        record_result(&self.recorder, "tracker", "list", &(), &result);
        result
    }

    fn show(&self, dir: &Path, id: &str) -> Result<LocalIssue, PortError> {
        let result = self.inner.show(dir, id);
        record_result(&self.recorder, "tracker", "show", &IdInput { id }, &result);
        result
    }

    fn create(&self, dir: &Path, issue: &NewLocalIssue) -> Result<String, PortError> {
        let result = self.inner.create(dir, issue);
        record_result(&self.recorder, "tracker", "create", issue, &result);
        result
    }

    fn update(&self, dir: &Path, id: &str, changes: &IssueChanges) -> Result<(), PortError> {
        let result = self.inner.update(dir, id, changes);
        record_result(&self.recorder, "tracker", "update", &UpdateInput { id, changes }, &result);
        result
    }
}
