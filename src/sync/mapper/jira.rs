//! Jira field mapping.
//!
//! Status travels as a Jira status category (`new`, `indeterminate`,
//! `done`). Type and priority are native Jira fields. All lookups are
//! case-insensitive.

use crate::model::{LocalIssue, RemoteIssue, Status};

use super::{user_labels, Mapper};

/// Prefix of the Jira sync marker label (`jira:<KEY>`).
pub const SYNC_LABEL_PREFIX: &str = "jira:";

/// Returns `true` for `jira:<KEY>` markers.
#[must_use]
pub fn is_sync_label(label: &str) -> bool {
    label.strip_prefix(SYNC_LABEL_PREFIX).is_some_and(|key| !key.is_empty())
}

/// Status category of issues that have not been started.
pub const CATEGORY_NEW: &str = "new";
/// Status category of issues in flight.
pub const CATEGORY_IN_PROGRESS: &str = "indeterminate";
/// Status category of finished issues.
pub const CATEGORY_DONE: &str = "done";

const DEFAULT_TYPE: (&str, &str) = ("Task", "task");
const DEFAULT_PRIORITY: (&str, &str) = ("Medium", "p2");

/// Jira issue type name ↔ local type. `chore` only maps outward.
const TYPES: &[(&str, &str)] =
    &[("Bug", "bug"), ("Story", "feature"), ("Task", "task"), ("Epic", "epic")];

/// Jira priority name ↔ local priority.
const PRIORITIES: &[(&str, &str)] = &[
    ("Highest", "p0"),
    ("High", "p1"),
    ("Medium", "p2"),
    ("Low", "p3"),
    ("Lowest", "p4"),
];

/// Maps a Jira status category key to a local status; unknown → `open`.
#[must_use]
pub fn map_jira_status_to_td(category: &str) -> Status {
    if category.eq_ignore_ascii_case(CATEGORY_DONE) {
        Status::Closed
    } else if category.eq_ignore_ascii_case(CATEGORY_IN_PROGRESS) {
        Status::InProgress
    } else {
        Status::Open
    }
}

/// Maps a local status to a Jira status category key.
#[must_use]
pub fn map_td_status_to_jira(status: Status) -> &'static str {
    match status {
        Status::Open => CATEGORY_NEW,
        Status::InProgress | Status::Blocked => CATEGORY_IN_PROGRESS,
        Status::Closed => CATEGORY_DONE,
    }
}

/// Maps a Jira issue type name to a local type; unknown → `task`.
#[must_use]
pub fn map_jira_type_to_td(name: &str) -> &'static str {
    TYPES
        .iter()
        .find(|(jira, _)| jira.eq_ignore_ascii_case(name))
        .map_or(DEFAULT_TYPE.1, |(_, td)| *td)
}

/// Maps a local type to a Jira issue type name; unknown → `Task`.
#[must_use]
pub fn map_td_type_to_jira(issue_type: &str) -> &'static str {
    if issue_type.eq_ignore_ascii_case("chore") {
        return "Task";
    }
    TYPES
        .iter()
        .find(|(_, td)| td.eq_ignore_ascii_case(issue_type))
        .map_or(DEFAULT_TYPE.0, |(jira, _)| *jira)
}

/// Maps a Jira priority name to a local priority; unknown → `p2`.
#[must_use]
pub fn map_jira_priority_to_td(name: &str) -> &'static str {
    PRIORITIES
        .iter()
        .find(|(jira, _)| jira.eq_ignore_ascii_case(name))
        .map_or(DEFAULT_PRIORITY.1, |(_, td)| *td)
}

/// Maps a local priority to a Jira priority name; unknown → `Medium`.
#[must_use]
pub fn map_td_priority_to_jira(priority: &str) -> &'static str {
    PRIORITIES
        .iter()
        .find(|(_, td)| td.eq_ignore_ascii_case(priority))
        .map_or(DEFAULT_PRIORITY.0, |(jira, _)| *jira)
}

/// Field mapper for Jira Cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct JiraMapper;

impl Mapper for JiraMapper {
    fn td_to_external(&self, issue: &LocalIssue) -> RemoteIssue {
        RemoteIssue {
            id: String::new(),
            title: issue.title.clone(),
            body: issue.description.clone(),
            state: map_td_status_to_jira(issue.status).to_string(),
            labels: user_labels(&issue.labels).cloned().collect(),
            issue_type: Some(map_td_type_to_jira(&issue.issue_type).to_string()),
            priority: Some(map_td_priority_to_jira(&issue.priority).to_string()),
            created_at: issue.updated_at,
            updated_at: issue.updated_at,
        }
    }

    fn external_to_td(&self, issue: &RemoteIssue) -> LocalIssue {
        LocalIssue {
            id: String::new(),
            title: issue.title.clone(),
            description: issue.body.clone(),
            status: map_jira_status_to_td(&issue.state),
            issue_type: map_jira_type_to_td(issue.issue_type.as_deref().unwrap_or_default())
                .to_string(),
            priority: map_jira_priority_to_td(issue.priority.as_deref().unwrap_or_default())
                .to_string(),
            labels: user_labels(&issue.labels).cloned().collect(),
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
        issue.state.eq_ignore_ascii_case(CATEGORY_DONE)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn local(status: Status, issue_type: &str, priority: &str, labels: &[&str]) -> LocalIssue {
        LocalIssue {
            id: "td-1".into(),
            title: "Checkout fails".into(),
            description: "First line\n\nSecond".into(),
            status,
            issue_type: issue_type.into(),
            priority: priority.into(),
            labels: labels.iter().map(ToString::to_string).collect(),
            updated_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn default_fallbacks() {
        assert_eq!(map_jira_priority_to_td("unknown"), "p2");
        assert_eq!(map_jira_type_to_td("Unknown"), "task");
        assert_eq!(map_td_type_to_jira("unknown"), "Task");
        assert_eq!(map_td_priority_to_jira(""), "Medium");
        assert_eq!(map_jira_status_to_td("whatever"), Status::Open);
    }

    #[test]
    fn lookups_ignore_case() {
        assert_eq!(map_jira_priority_to_td("HIGHEST"), "p0");
        assert_eq!(map_td_priority_to_jira("P4"), "Lowest");
        assert_eq!(map_jira_type_to_td("story"), "feature");
        assert_eq!(map_jira_status_to_td("Done"), Status::Closed);
        assert_eq!(map_jira_status_to_td("INDETERMINATE"), Status::InProgress);
    }

    #[test]
    fn chore_maps_out_but_not_back() {
        assert_eq!(map_td_type_to_jira("chore"), "Task");
        assert_eq!(map_jira_type_to_td("Task"), "task");
    }

    #[test]
    fn in_progress_and_blocked_share_a_category() {
        assert_eq!(map_td_status_to_jira(Status::InProgress), "indeterminate");
        assert_eq!(map_td_status_to_jira(Status::Blocked), "indeterminate");
        assert_eq!(map_td_status_to_jira(Status::Open), "new");
        assert_eq!(map_td_status_to_jira(Status::Closed), "done");
    }

    #[test]
    fn pushes_native_fields_and_user_labels() {
        let ext =
            JiraMapper.td_to_external(&local(Status::Closed, "bug", "p0", &["jira:PROJ-3", "ops"]));
        assert_eq!(ext.issue_type.as_deref(), Some("Bug"));
        assert_eq!(ext.priority.as_deref(), Some("Highest"));
        assert_eq!(ext.labels, vec!["ops"]);
        assert_eq!(ext.state, "done");
        assert!(JiraMapper.is_closed(&ext));
    }

    #[test]
    fn pulls_native_fields() {
        let mut ext = JiraMapper.td_to_external(&local(Status::Open, "feature", "p3", &["ops"]));
        ext.id = "PROJ-9".into();
        ext.labels.push("jira:PROJ-9".into());

        let td = JiraMapper.external_to_td(&ext);
        assert_eq!(td.issue_type, "feature");
        assert_eq!(td.priority, "p3");
        assert_eq!(td.labels, vec!["ops"]);
        assert_eq!(td.status, Status::Open);
    }

    #[test]
    fn missing_native_fields_use_defaults() {
        let mut ext = JiraMapper.td_to_external(&local(Status::Open, "", "", &[]));
        ext.issue_type = None;
        ext.priority = None;
        let td = JiraMapper.external_to_td(&ext);
        assert_eq!(td.issue_type, "task");
        assert_eq!(td.priority, "p2");
    }

    #[test]
    fn sync_label_format() {
        assert_eq!(JiraMapper.sync_label("PROJ-12"), "jira:PROJ-12");
        assert!(JiraMapper.is_internal_label("jira:PROJ-12"));
        assert!(JiraMapper.is_internal_label("gh:#3"));
    }
}
