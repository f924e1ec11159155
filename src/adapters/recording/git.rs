//! Recording adapter for the `GitRepo` port.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::SharedRecorder;
use crate::error::PortError;
use crate::ports::GitRepo;

/// Records git queries while delegating to an inner implementation.
pub struct RecordingGitRepo {
    inner: Arc<dyn GitRepo>,
    recorder: SharedRecorder,
}

impl RecordingGitRepo {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn GitRepo>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RemoteInput<'a> {
    remote: &'a str,
}

impl GitRepo for RecordingGitRepo {
    fn remote_url(&self, dir: &Path, remote: &str) -> Result<String, PortError> {
        let result = self.inner.remote_url(dir, remote);
        record_result(&self.recorder, "git", "remote_url", &RemoteInput { remote }, &result);
        result
    }
}
