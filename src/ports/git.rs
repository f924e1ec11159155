//! Git repository port.

use std::path::Path;

use crate::error::PortError;

/// Read access to the git configuration of a working directory.
pub trait GitRepo: Send + Sync {
    /// Returns the URL configured for `remote` in the repository at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a repository or the remote is unset.
    fn remote_url(&self, dir: &Path, remote: &str) -> Result<String, PortError>;
}
