//! Normalized issue model shared by the mappers, providers, and engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Workflow status of a local issue.
///
/// Parsing is total: anything the local tracker reports that is not one of
/// the four known statuses is treated as [`Status::Open`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// Not started.
    #[default]
    Open,
    /// Being worked on.
    InProgress,
    /// Waiting on something else.
    Blocked,
    /// Done.
    Closed,
}

impl Status {
    /// Parses a status string, falling back to `Open` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "in_progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "closed" => Self::Closed,
            _ => Self::Open,
        }
    }

    /// The status token the local tracker CLI understands.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue as the local tracker reports it.
///
/// `labels` may contain sync marker labels; filter them with
/// [`crate::sync::mapper::is_internal_label`] before treating the set as
/// user labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalIssue {
    /// Opaque local ID (e.g. `td-abc123`).
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Workflow status.
    #[serde(default)]
    pub status: Status,
    /// Issue type (`bug`, `feature`, `task`, `chore`, `epic`) or empty.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub issue_type: String,
    /// Priority (`p0`..`p4`) or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    /// Labels, including any sync markers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl LocalIssue {
    /// Returns `true` if the issue already carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Appends `label` unless it is already present.
    pub fn add_label(&mut self, label: String) {
        if !self.has_label(&label) {
            self.labels.push(label);
        }
    }
}

/// An issue as a remote provider reports it, normalized across providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Provider-specific ID (GitHub issue number, Jira issue key).
    pub id: String,
    /// Issue title / summary.
    pub title: String,
    /// Plain-text body.
    pub body: String,
    /// Provider-specific state token (`open`/`closed` on GitHub, a status
    /// category key on Jira).
    pub state: String,
    /// Labels as stored remotely.
    pub labels: Vec<String>,
    /// Native issue type, when the provider has one.
    pub issue_type: Option<String>,
    /// Native priority, when the provider has one.
    pub priority: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Issues created or updated locally.
    pub pulled: usize,
    /// Issues created or updated remotely.
    pub pushed: usize,
    /// One message per issue that failed, in processing order.
    pub errors: Vec<String>,
}

impl SyncResult {
    /// One-line summary suitable for a status toast.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!("Pulled {}, pushed {}", self.pulled, self.pushed);
        match self.errors.len() {
            0 => {}
            1 => line.push_str(" (1 error)"),
            n => line.push_str(&format!(" ({n} errors)")),
        }
        line
    }
}

/// Deserializes `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
