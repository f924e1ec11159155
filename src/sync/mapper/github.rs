//! GitHub field mapping.
//!
//! GitHub issues only have an open/closed state, so the three non-closed
//! local statuses collapse to `open` and come back as `open`. Type and
//! priority travel as labels.

use crate::model::{LocalIssue, RemoteIssue, Status};

use super::{user_labels, Mapper};

/// Prefix of the GitHub sync marker label (`gh:#<number>`).
pub const SYNC_LABEL_PREFIX: &str = "gh:#";

/// Prefix of priority labels (`priority:<value>`).
pub const PRIORITY_LABEL_PREFIX: &str = "priority:";

/// Returns `true` for `gh:#<digits>` and the legacy `td-sync` marker.
#[must_use]
pub fn is_sync_label(label: &str) -> bool {
    if label == super::LEGACY_SYNC_LABEL {
        return true;
    }
    label
        .strip_prefix(SYNC_LABEL_PREFIX)
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}

const STATE_OPEN: &str = "open";
const STATE_CLOSED: &str = "closed";

/// Local type → GitHub label.
const TYPE_TO_LABEL: &[(&str, &str)] =
    &[("bug", "bug"), ("feature", "enhancement"), ("task", "task"), ("chore", "task")];

/// GitHub label → local type. Deliberately partial.
const LABEL_TO_TYPE: &[(&str, &str)] =
    &[("bug", "bug"), ("enhancement", "feature"), ("task", "task")];

/// Maps a local status to a GitHub state.
#[must_use]
pub fn map_status_to_gh(status: Status) -> &'static str {
    if status == Status::Closed {
        STATE_CLOSED
    } else {
        STATE_OPEN
    }
}

/// Maps a GitHub state to a local status. Case-sensitive: anything other
/// than `closed` is `open`.
#[must_use]
pub fn map_status_from_gh(state: &str) -> Status {
    if state == STATE_CLOSED {
        Status::Closed
    } else {
        Status::Open
    }
}

/// The label that encodes a local type, if the type has one.
#[must_use]
pub fn map_type_to_label(issue_type: &str) -> Option<&'static str> {
    lookup(TYPE_TO_LABEL, issue_type)
}

/// The local type encoded by a label, if any.
#[must_use]
pub fn map_label_to_type(label: &str) -> Option<&'static str> {
    lookup(LABEL_TO_TYPE, label)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Field mapper for GitHub Issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubMapper;

impl Mapper for GitHubMapper {
    fn td_to_external(&self, issue: &LocalIssue) -> RemoteIssue {
        let mut labels = Vec::new();
        if let Some(label) = map_type_to_label(&issue.issue_type) {
            labels.push(label.to_string());
        }
        if !issue.priority.is_empty() {
            labels.push(format!("{PRIORITY_LABEL_PREFIX}{}", issue.priority));
        }
        for label in user_labels(&issue.labels) {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        RemoteIssue {
            id: String::new(),
            title: issue.title.clone(),
            body: issue.description.clone(),
            state: map_status_to_gh(issue.status).to_string(),
            labels,
            issue_type: None,
            priority: None,
            created_at: issue.updated_at,
            updated_at: issue.updated_at,
        }
    }

    fn external_to_td(&self, issue: &RemoteIssue) -> LocalIssue {
        let mut issue_type = String::new();
        let mut priority = String::new();
        let mut labels = Vec::new();

        for label in user_labels(&issue.labels) {
            if let Some(value) = label.strip_prefix(PRIORITY_LABEL_PREFIX) {
                if priority.is_empty() {
                    priority = value.to_string();
                }
            } else if let Some(mapped) = map_label_to_type(label) {
                if issue_type.is_empty() {
                    issue_type = mapped.to_string();
                }
            } else {
                labels.push(label.clone());
            }
        }

        LocalIssue {
            id: String::new(),
            title: issue.title.clone(),
            description: issue.body.clone(),
            status: map_status_from_gh(&issue.state),
            issue_type,
            priority,
            labels,
            updated_at: issue.updated_at,
        }
    }

    fn sync_label(&self, external_id: &str) -> String {
        format!("{SYNC_LABEL_PREFIX}{external_id}")
    }

    fn owns_label(&self, label: &str) -> bool {
        is_sync_label(label)
    }

    fn is_closed(&self, issue: &RemoteIssue) -> bool {
        issue.state == STATE_CLOSED
    }
}
