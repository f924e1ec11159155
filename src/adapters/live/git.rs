//! Live git adapter using the `git` CLI.

use std::path::Path;
use std::process::Command;

use crate::error::PortError;
use crate::ports::git::GitRepo;

/// Live git adapter that shells out to the `git` CLI.
pub struct LiveGitRepo;

impl GitRepo for LiveGitRepo {
    fn remote_url(&self, dir: &Path, remote: &str) -> Result<String, PortError> {
        let output =
            Command::new("git").args(["remote", "get-url", remote]).current_dir(dir).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git remote get-url {remote} failed: {}", stderr.trim()).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LiveGitRepo.remote_url(dir.path(), "origin").is_err());
    }
}
