//! Remote issue trackers.
//!
//! A [`Provider`] performs the remote side of a sync pass: listing issues,
//! creating and editing them, and moving them between open and closed.
//! Field translation is the [`Mapper`]'s job; providers only move
//! [`RemoteIssue`] values over the wire.

pub mod github;
pub mod jira;

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use github::GitHubProvider;
pub use jira::JiraProvider;

use crate::error::SyncError;
use crate::model::RemoteIssue;
use crate::sync::mapper::{GitHubMapper, JiraMapper, Mapper};

/// Boxed future returned by [`Provider`] methods so the trait stays
/// dyn-compatible.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send + 'a>>;

/// Remote I/O for one external issue tracker.
pub trait Provider: Send + Sync {
    /// Stable identifier, used in state file names (`github`, `jira`).
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Checks that the provider can be used from `work_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration or connectivity check fails
    /// outright rather than merely reporting "not available".
    fn available<'a>(&'a self, work_dir: &'a Path) -> ProviderFuture<'a, bool>;

    /// Lists every remote issue, open and closed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport, remote, or parse failures.
    fn list<'a>(&'a self, work_dir: &'a Path) -> ProviderFuture<'a, Vec<RemoteIssue>>;

    /// Creates a remote issue and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote rejects the issue.
    fn create<'a>(&'a self, work_dir: &'a Path, issue: &'a RemoteIssue)
        -> ProviderFuture<'a, String>;

    /// Overwrites title, body and labels (and native fields where the
    /// remote has them) of `external_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote rejects the edit.
    fn update<'a>(
        &'a self,
        work_dir: &'a Path,
        external_id: &'a str,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, ()>;

    /// Closes `external_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote refuses the transition.
    fn close<'a>(&'a self, work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()>;

    /// Reopens `external_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote refuses the transition, including
    /// when the issue is already open on some remotes.
    fn reopen<'a>(&'a self, work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()>;
}

/// Built-in providers, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    /// GitHub Issues through the `gh` CLI.
    #[value(name = "github", alias = "gh")]
    GitHub,
    /// Jira Cloud through REST v3.
    Jira,
}

impl ProviderKind {
    /// The provider ID used in state file names.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::GitHub => github::PROVIDER_ID,
            Self::Jira => jira::PROVIDER_ID,
        }
    }

    /// The mapper paired with this provider.
    #[must_use]
    pub fn mapper(self) -> Box<dyn Mapper> {
        match self {
            Self::GitHub => Box::new(GitHubMapper),
            Self::Jira => Box::new(JiraMapper),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
