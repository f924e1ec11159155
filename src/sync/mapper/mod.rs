//! Field translation between local issues and a provider's remote issues.
//!
//! Both directions are total: values a table does not know fall back to a
//! documented default instead of failing.

pub mod github;
pub mod jira;

pub use github::GitHubMapper;
pub use jira::JiraMapper;

use crate::model::{LocalIssue, RemoteIssue};

/// Legacy sync marker written by the GitHub-only versions of the tool.
pub const LEGACY_SYNC_LABEL: &str = "td-sync";

/// Per-provider translation strategy.
pub trait Mapper: Send + Sync {
    /// Maps a local issue to the provider's representation.
    fn td_to_external(&self, issue: &LocalIssue) -> RemoteIssue;

    /// Maps a remote issue to a local issue. The returned `id` is empty
    /// and `labels` hold user labels only.
    fn external_to_td(&self, issue: &RemoteIssue) -> LocalIssue;

    /// The marker label recording which remote issue a local issue is
    /// paired with.
    fn sync_label(&self, external_id: &str) -> String;

    /// Returns `true` for labels that are sync markers rather than user
    /// labels.
    fn is_internal_label(&self, label: &str) -> bool {
        is_internal_label(label)
    }

    /// Returns `true` for sync markers written by this provider. Markers of
    /// other providers are internal but not owned.
    fn owns_label(&self, label: &str) -> bool;

    /// Returns `true` if the remote issue's state means "closed" for this
    /// provider. The engine branches on this instead of comparing state
    /// tokens itself.
    fn is_closed(&self, issue: &RemoteIssue) -> bool;
}

/// Returns `true` for `td-sync`, `gh:#<digits>` and `jira:<key>`.
#[must_use]
pub fn is_internal_label(label: &str) -> bool {
    github::is_sync_label(label) || jira::is_sync_label(label)
}

/// Labels from `labels` that are not sync markers, in order.
pub fn user_labels<'a>(labels: &'a [String]) -> impl Iterator<Item = &'a String> + 'a {
    labels.iter().filter(|label| !is_internal_label(label))
}
