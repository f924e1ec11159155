//! Shell executor port for running external commands.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// The output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOutput {
    /// The exit code of the process (`-1` if it was killed by a signal).
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl ShellOutput {
    /// Returns `true` if the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs.
///
/// Arguments are passed as a vector, never through a shell, so issue
/// titles and bodies need no quoting.
pub trait ShellExecutor: Send + Sync {
    /// Runs `program` with `args` in `dir` and waits for it to exit.
    ///
    /// A non-zero exit is reported through [`ShellOutput::exit_code`], not
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<ShellOutput, PortError>;

    /// Resolves `program` against `PATH`.
    fn find_program(&self, program: &str) -> Option<PathBuf>;
}
