//! Per-provider sync state persistence.
//!
//! Each provider gets its own `<provider>-sync.json` in the tracker state
//! directory. The file maps local issue IDs to the remote issue they are
//! paired with, plus the timestamps seen at the last successful sync.
//!
//! Older GitHub-only versions wrote a single `gh-sync.json`. Loading the
//! `github` state migrates that file on first use; the legacy file is left
//! in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SyncError;
use crate::model::null_as_default;
use crate::ports::FileSystem;

/// File name of the legacy GitHub-only state.
pub const LEGACY_STATE_FILE: &str = "gh-sync.json";

/// Provider whose state may be migrated from [`LEGACY_STATE_FILE`].
const LEGACY_PROVIDER: &str = "github";

/// Pairing of one local issue with its remote counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStateEntry {
    /// Remote issue ID (`42` on GitHub, `PROJ-7` on Jira).
    pub external_id: String,
    /// Local `updated_at` recorded at the last successful sync.
    #[serde(rename = "tdUpdatedAt")]
    pub local_updated_at: DateTime<Utc>,
    /// Remote `updated_at` recorded at the last successful sync.
    pub remote_updated_at: DateTime<Utc>,
}

/// Sync state of one provider in one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Provider ID (`github`, `jira`).
    pub provider_id: String,
    /// Free-form provider data such as the GitHub owner and repo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_meta: Option<BTreeMap<String, String>>,
    /// Local issue ID → entry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: BTreeMap<String, SyncStateEntry>,
}

impl SyncState {
    /// An empty state for `provider_id`.
    #[must_use]
    pub fn new(provider_id: &str) -> Self {
        Self { provider_id: provider_id.to_string(), ..Self::default() }
    }

    /// Looks up the entry for a local issue.
    #[must_use]
    pub fn find_by_td_id(&self, local_id: &str) -> Option<&SyncStateEntry> {
        self.issues.get(local_id)
    }

    /// Looks up the local issue paired with a remote issue.
    #[must_use]
    pub fn find_by_external_id(&self, external_id: &str) -> Option<(&str, &SyncStateEntry)> {
        self.issues
            .iter()
            .find(|(_, entry)| entry.external_id == external_id)
            .map(|(id, entry)| (id.as_str(), entry))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    gh_number: u64,
    // Missing timestamps fall back to the epoch.
    #[serde(default)]
    td_updated_at: DateTime<Utc>,
    #[serde(default)]
    gh_updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct LegacyState {
    #[serde(default)]
    owner: String,
    #[serde(default)]
    repo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    issues: BTreeMap<String, LegacyEntry>,
}

impl From<LegacyState> for SyncState {
    fn from(legacy: LegacyState) -> Self {
        let meta = BTreeMap::from([
            ("owner".to_string(), legacy.owner),
            ("repo".to_string(), legacy.repo),
        ]);
        let issues = legacy
            .issues
            .into_iter()
            .map(|(id, old)| {
                let entry = SyncStateEntry {
                    external_id: old.gh_number.to_string(),
                    local_updated_at: old.td_updated_at,
                    remote_updated_at: old.gh_updated_at,
                };
                (id, entry)
            })
            .collect();
        Self { provider_id: LEGACY_PROVIDER.to_string(), provider_meta: Some(meta), issues }
    }
}

/// Path of the state file for `provider_id` under `dir`.
#[must_use]
pub fn state_path(dir: &Path, provider_id: &str) -> PathBuf {
    dir.join(format!("{provider_id}-sync.json"))
}

/// Loads the state for `provider_id`. A missing file yields an empty
/// state; for `github` a legacy `gh-sync.json` is migrated first.
///
/// # Errors
///
/// Returns [`SyncError::State`] if a file exists but cannot be read, or
/// [`SyncError::Parse`] if it is malformed.
pub fn load_state(
    fs: &dyn FileSystem,
    dir: &Path,
    provider_id: &str,
) -> Result<SyncState, SyncError> {
    let path = state_path(dir, provider_id);
    if fs.exists(&path) {
        let mut state: SyncState = read_json(fs, &path)?;
        if state.provider_id.is_empty() {
            state.provider_id = provider_id.to_string();
        }
        debug!(provider = provider_id, entries = state.issues.len(), "loaded sync state");
        return Ok(state);
    }

    if provider_id == LEGACY_PROVIDER {
        let legacy_path = dir.join(LEGACY_STATE_FILE);
        if fs.exists(&legacy_path) {
            let legacy: LegacyState = read_json(fs, &legacy_path)?;
            let state = SyncState::from(legacy);
            save_state(fs, dir, provider_id, &state)?;
            info!(
                provider = provider_id,
                entries = state.issues.len(),
                "migrated legacy {LEGACY_STATE_FILE}"
            );
            return Ok(state);
        }
    }

    Ok(SyncState::new(provider_id))
}

/// Writes `state` to `<dir>/<provider_id>-sync.json` as pretty JSON.
///
/// # Errors
///
/// Returns [`SyncError::State`] if the file cannot be written.
pub fn save_state(
    fs: &dyn FileSystem,
    dir: &Path,
    provider_id: &str,
    state: &SyncState,
) -> Result<(), SyncError> {
    let path = state_path(dir, provider_id);
    let json = serde_json::to_string_pretty(state)
        .map_err(|source| SyncError::Parse { what: path.display().to_string(), source })?;
    fs.write(&path, &json).map_err(|source| SyncError::State { path, source })
}

fn read_json<T: serde::de::DeserializeOwned>(
    fs: &dyn FileSystem,
    path: &Path,
) -> Result<T, SyncError> {
    let contents = fs
        .read_to_string(path)
        .map_err(|source| SyncError::State { path: path.to_path_buf(), source })?;
    serde_json::from_str(&contents)
        .map_err(|source| SyncError::Parse { what: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::MemFs;

    fn dir() -> &'static Path {
        Path::new("/proj/.todos")
    }

    fn entry(external_id: &str) -> SyncStateEntry {
        SyncStateEntry {
            external_id: external_id.to_string(),
            local_updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            remote_updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
        }
    }

    const LEGACY_JSON: &str = r#"{
        "owner": "marcus",
        "repo": "sidecar",
        "issues": {
            "td-abc123": {
                "ghNumber": 42,
                "tdUpdatedAt": "2025-01-01T00:00:00Z",
                "ghUpdatedAt": "2025-01-02T00:00:00Z"
            }
        }
    }"#;

    #[test]
    fn missing_file_yields_empty_state() {
        let fs = MemFs::new();
        let state = load_state(&fs, dir(), "jira").unwrap();
        assert_eq!(state.provider_id, "jira");
        assert!(state.issues.is_empty());
        assert!(state.provider_meta.is_none());
    }

    #[test]
    fn migrates_legacy_github_state() {
        let fs = MemFs::new();
        fs.insert(dir().join("gh-sync.json"), LEGACY_JSON);

        let state = load_state(&fs, dir(), "github").unwrap();

        assert_eq!(state.provider_id, "github");
        let meta = state.provider_meta.as_ref().unwrap();
        assert_eq!(meta["owner"], "marcus");
        assert_eq!(meta["repo"], "sidecar");
        assert_eq!(state.issues["td-abc123"].external_id, "42");
        assert_eq!(
            state.issues["td-abc123"].remote_updated_at,
            Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
        );
        assert!(fs.exists(&dir().join("gh-sync.json")));
        assert!(fs.exists(&dir().join("github-sync.json")));
        assert_eq!(load_state(&fs, dir(), "github").unwrap(), state);
    }

    #[test]
    fn legacy_entry_without_timestamps_migrates_as_epoch() {
        let fs = MemFs::new();
        fs.insert(
            dir().join("gh-sync.json"),
            r#"{"owner": "marcus", "repo": "sidecar", "issues": {"td-1": {"ghNumber": 9}}}"#,
        );

        let state = load_state(&fs, dir(), "github").unwrap();

        let entry = &state.issues["td-1"];
        assert_eq!(entry.external_id, "9");
        assert_eq!(entry.local_updated_at, DateTime::<Utc>::default());
        assert_eq!(entry.remote_updated_at.timestamp(), 0);
    }

    #[test]
    fn legacy_file_is_ignored_for_other_providers() {
        let fs = MemFs::new();
        fs.insert(dir().join("gh-sync.json"), LEGACY_JSON);

        let state = load_state(&fs, dir(), "jira").unwrap();
        assert!(state.issues.is_empty());
        assert!(!fs.exists(&dir().join("jira-sync.json")));
    }

    #[test]
    fn current_file_wins_over_legacy() {
        let fs = MemFs::new();
        fs.insert(dir().join("gh-sync.json"), LEGACY_JSON);
        let mut current = SyncState::new("github");
        current.issues.insert("td-new".into(), entry("7"));
        save_state(&fs, dir(), "github", &current).unwrap();

        let state = load_state(&fs, dir(), "github").unwrap();
        assert_eq!(state, current);
    }

    #[test]
    fn providers_do_not_share_state() {
        let fs = MemFs::new();
        let mut github = SyncState::new("github");
        github.issues.insert("td-1".into(), entry("42"));
        let mut jira = SyncState::new("jira");
        jira.issues.insert("td-2".into(), entry("PROJ-2"));

        save_state(&fs, dir(), "github", &github).unwrap();
        save_state(&fs, dir(), "jira", &jira).unwrap();

        let loaded = load_state(&fs, dir(), "github").unwrap();
        assert!(loaded.find_by_td_id("td-2").is_none());
        assert_eq!(loaded.find_by_td_id("td-1").unwrap().external_id, "42");
        let loaded = load_state(&fs, dir(), "jira").unwrap();
        assert!(loaded.find_by_td_id("td-1").is_none());
    }

    #[test]
    fn null_issues_deserialize_to_empty_map() {
        let fs = MemFs::new();
        fs.insert(state_path(dir(), "jira"), r#"{"providerId":"jira","issues":null}"#);
        let state = load_state(&fs, dir(), "jira").unwrap();
        assert!(state.issues.is_empty());

        fs.insert(state_path(dir(), "jira"), r#"{"providerId":"jira"}"#);
        assert!(load_state(&fs, dir(), "jira").unwrap().issues.is_empty());
    }

    #[test]
    fn writes_camel_case_keys() {
        let fs = MemFs::new();
        let mut state = SyncState::new("jira");
        state.issues.insert("td-1".into(), entry("PROJ-1"));
        save_state(&fs, dir(), "jira", &state).unwrap();

        let json = fs.read_to_string(&state_path(dir(), "jira")).unwrap();
        for key in ["\"providerId\"", "\"externalId\"", "\"tdUpdatedAt\"", "\"remoteUpdatedAt\""] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(json.contains('\n'));
    }

    #[test]
    fn malformed_state_is_a_parse_error() {
        let fs = MemFs::new();
        fs.insert(state_path(dir(), "jira"), "{not json");
        let err = load_state(&fs, dir(), "jira").unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
    }

    #[test]
    fn find_by_external_id_returns_local_id() {
        let mut state = SyncState::new("github");
        state.issues.insert("td-1".into(), entry("42"));
        state.issues.insert("td-2".into(), entry("43"));

        let (id, found) = state.find_by_external_id("43").unwrap();
        assert_eq!(id, "td-2");
        assert_eq!(found.external_id, "43");
        assert!(state.find_by_external_id("99").is_none());
    }
}
