//! Local issue tracker port.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PortError;
use crate::model::{LocalIssue, Status};

/// Fields for a new local issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocalIssue {
    /// Issue title.
    pub title: String,
    /// Description; omitted from the command when empty.
    pub description: String,
    /// Issue type; omitted when empty.
    pub issue_type: String,
    /// Priority; omitted when empty.
    pub priority: String,
    /// Labels; omitted when empty.
    pub labels: Vec<String>,
}

/// A partial update of a local issue. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<Status>,
    /// New issue type.
    pub issue_type: Option<String>,
    /// New priority.
    pub priority: Option<String>,
    /// Replacement label set.
    pub labels: Option<Vec<String>>,
}

impl IssueChanges {
    /// Changes that overwrite every synced field with `issue`'s values.
    #[must_use]
    pub fn overwrite_with(issue: &LocalIssue) -> Self {
        Self {
            title: Some(issue.title.clone()),
            description: Some(issue.description.clone()),
            status: Some(issue.status),
            issue_type: Some(issue.issue_type.clone()),
            priority: Some(issue.priority.clone()),
            labels: Some(issue.labels.clone()),
        }
    }

    /// Changes that only replace the label set.
    #[must_use]
    pub fn labels(labels: Vec<String>) -> Self {
        Self { labels: Some(labels), ..Self::default() }
    }

    /// Returns `true` if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The local issue tracker (the `td` CLI in production).
pub trait LocalTracker: Send + Sync {
    /// Lists every local issue in the project at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker fails or its output cannot be parsed.
    fn list(&self, dir: &Path) -> Result<Vec<LocalIssue>, PortError>;

    /// Fetches a single issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist or the output is malformed.
    fn show(&self, dir: &Path, id: &str) -> Result<LocalIssue, PortError>;

    /// Creates an issue and returns its new ID.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails or no ID can be found in the output.
    fn create(&self, dir: &Path, issue: &NewLocalIssue) -> Result<String, PortError>;

    /// Applies `changes` to the issue `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker rejects the update.
    fn update(&self, dir: &Path, id: &str, changes: &IssueChanges) -> Result<(), PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_with_copies_all_synced_fields() {
        let issue: LocalIssue = serde_json::from_value(serde_json::json!({
            "id": "td-1",
            "title": "Title",
            "description": "Body",
            "status": "blocked",
            "type": "bug",
            "priority": "p0",
            "labels": ["x"],
            "updated_at": "2025-01-10T12:00:00Z"
        }))
        .unwrap();
        let changes = IssueChanges::overwrite_with(&issue);
        assert_eq!(changes.status, Some(Status::Blocked));
        assert_eq!(changes.labels.as_deref(), Some(&["x".to_string()][..]));
        assert!(!changes.is_empty());
        assert!(IssueChanges::default().is_empty());
    }
}
