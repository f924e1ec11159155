//! Recording adapter for the `ShellExecutor` port.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::{record_result, record_value};
use crate::cassette::recorder::SharedRecorder;
use crate::error::PortError;
use crate::ports::{ShellExecutor, ShellOutput};

/// Records process runs while delegating to an inner executor.
pub struct RecordingShellExecutor {
    inner: Arc<dyn ShellExecutor>,
    recorder: SharedRecorder,
}

impl RecordingShellExecutor {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn ShellExecutor>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RunInput<'a> {
    program: &'a str,
    args: &'a [String],
}

#[derive(Serialize)]
struct ProgramInput<'a> {
    program: &'a str,
}

impl ShellExecutor for RecordingShellExecutor {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<ShellOutput, PortError> {
        let result = self.inner.run(program, args, dir);
        record_result(&self.recorder, "shell", "run", &RunInput { program, args }, &result);
        result
    }

    fn find_program(&self, program: &str) -> Option<PathBuf> {
        let found = self.inner.find_program(program);
        record_value(&self.recorder, "shell", "find_program", &ProgramInput { program }, &found);
        found
    }
}
