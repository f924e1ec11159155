//! Error type for the sync layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::SyncResult;

/// Boxed error returned by port traits.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while talking to providers, the local tracker, or the
/// sync state files.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required provider settings are missing.
    #[error("{provider} is not configured: {reason}")]
    NotConfigured {
        /// Provider ID.
        provider: &'static str,
        /// What is missing.
        reason: String,
    },

    /// The provider cannot be used from this working directory.
    #[error("{provider} is not available in {}", .dir.display())]
    Unavailable {
        /// Provider ID.
        provider: &'static str,
        /// Working directory that was checked.
        dir: PathBuf,
    },

    /// A subprocess could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: PortError,
    },

    /// A subprocess exited with a non-zero status.
    #[error("{command} failed (exit {exit_code}): {stderr}")]
    Command {
        /// Command line that was run.
        command: String,
        /// Process exit code.
        exit_code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An HTTP call returned a non-success status.
    #[error("{method} {url} returned {status}: {body}")]
    Http {
        /// HTTP method.
        method: &'static str,
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// An HTTP call failed before a response arrived.
    #[error("{operation} request failed: {source}")]
    Transport {
        /// What the request was for.
        operation: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Output from a remote, the local CLI, or a state file was malformed.
    #[error("failed to parse {what}: {source}")]
    Parse {
        /// What was being parsed.
        what: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The Jira workflow has no transition into the wanted status category.
    #[error("no transition found to status category '{category}' for {issue}")]
    NoTransition {
        /// Jira issue key.
        issue: String,
        /// Target status category key.
        category: &'static str,
    },

    /// The local tracker rejected an operation.
    #[error("local tracker {operation} failed: {source}")]
    Tracker {
        /// Tracker operation (list, show, create, update).
        operation: &'static str,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// A sync state file could not be read or written.
    #[error("sync state {}: {source}", .path.display())]
    State {
        /// State file path.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// The pass ran but its state could not be saved.
    #[error("sync finished but state was not saved: {source}")]
    Persist {
        /// Counters and errors gathered before the save failed.
        partial: Box<SyncResult>,
        /// The save error.
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Returns the partial result carried by a [`SyncError::Persist`].
    #[must_use]
    pub fn partial_result(&self) -> Option<&SyncResult> {
        match self {
            Self::Persist { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
