//! Live shell executor using `std::process::Command`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::PortError;
use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Live executor that spawns real processes.
pub struct LiveShellExecutor;

impl ShellExecutor for LiveShellExecutor {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<ShellOutput, PortError> {
        let output = Command::new(program).args(args).current_dir(dir).output()?;
        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn find_program(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let paths = env::var_os("PATH")?;
        env::split_paths(&paths).map(|dir| dir.join(program)).find(|path| path.is_file())
    }
}
