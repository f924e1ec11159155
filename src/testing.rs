//! In-memory port fakes shared by unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::context::ServiceContext;
use crate::error::{PortError, SyncError};
use crate::model::{LocalIssue, RemoteIssue, Status};
use crate::ports::{
    Clock, FileSystem, GitRepo, IssueChanges, LocalTracker, NewLocalIssue, ShellExecutor,
    ShellOutput,
};
use crate::sync::provider::{Provider, ProviderFuture};

/// `2025-01-<day> 12:00:00 UTC`.
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap()
}

/// In-memory filesystem.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: Mutex<bool>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if *self.fail_writes.lock().unwrap() {
            return Err("disk full".into());
        }
        self.insert(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter(|k| k.parent() == Some(path))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Clock frozen at a settable instant.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Git and shell ports for tests that must never reach them.
pub struct Unreachable;

impl GitRepo for Unreachable {
    fn remote_url(&self, _dir: &Path, _remote: &str) -> Result<String, PortError> {
        Err("git is not available in this test".into())
    }
}

impl ShellExecutor for Unreachable {
    fn run(&self, program: &str, _args: &[String], _dir: &Path) -> Result<ShellOutput, PortError> {
        Err(format!("{program} is not available in this test").into())
    }

    fn find_program(&self, _program: &str) -> Option<PathBuf> {
        None
    }
}

/// In-memory local tracker. Every write stamps `updated_at` with the
/// shared clock, like `td` does.
pub struct FakeTracker {
    clock: Arc<FixedClock>,
    issues: Mutex<Vec<LocalIssue>>,
    next_id: Mutex<u32>,
    failing: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn new(clock: Arc<FixedClock>) -> Self {
        Self {
            clock,
            issues: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn seed(&self, issue: LocalIssue) {
        self.issues.lock().unwrap().push(issue);
    }

    /// Makes `<op>` (`create`, `update:<id>`, `show:<id>`, `list`) fail.
    pub fn fail(&self, op: &str) {
        self.failing.lock().unwrap().insert(op.to_string());
    }

    pub fn issues(&self) -> Vec<LocalIssue> {
        self.issues.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<LocalIssue> {
        self.issues().into_iter().find(|issue| issue.id == id)
    }

    pub fn edit(&self, id: &str, change: impl FnOnce(&mut LocalIssue)) {
        let mut issues = self.issues.lock().unwrap();
        if let Some(issue) = issues.iter_mut().find(|issue| issue.id == id) {
            change(issue);
        }
    }

    fn enter(&self, op: String) -> Result<(), PortError> {
        let failing = self.failing.lock().unwrap().contains(&op);
        self.calls.lock().unwrap().push(op.clone());
        if failing {
            return Err(format!("td {op} failed").into());
        }
        Ok(())
    }
}

impl LocalTracker for FakeTracker {
    fn list(&self, _dir: &Path) -> Result<Vec<LocalIssue>, PortError> {
        self.enter("list".into())?;
        Ok(self.issues())
    }

    fn show(&self, _dir: &Path, id: &str) -> Result<LocalIssue, PortError> {
        self.enter(format!("show:{id}"))?;
        self.get(id).ok_or_else(|| format!("issue {id} not found").into())
    }

    fn create(&self, _dir: &Path, issue: &NewLocalIssue) -> Result<String, PortError> {
        self.enter("create".into())?;
        let mut next = self.next_id.lock().unwrap();
        let id = format!("td-{next:03}");
        *next += 1;
        self.seed(LocalIssue {
            id: id.clone(),
            title: issue.title.clone(),
            description: issue.description.clone(),
            status: Status::Open,
            issue_type: issue.issue_type.clone(),
            priority: issue.priority.clone(),
            labels: issue.labels.clone(),
            updated_at: self.clock.now(),
        });
        Ok(id)
    }

    fn update(&self, _dir: &Path, id: &str, changes: &IssueChanges) -> Result<(), PortError> {
        self.enter(format!("update:{id}"))?;
        let now = self.clock.now();
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| format!("issue {id} not found"))?;
        if let Some(title) = &changes.title {
            issue.title.clone_from(title);
        }
        if let Some(description) = &changes.description {
            issue.description.clone_from(description);
        }
        if let Some(status) = changes.status {
            issue.status = status;
        }
        if let Some(issue_type) = changes.issue_type.as_ref().filter(|t| !t.is_empty()) {
            issue.issue_type.clone_from(issue_type);
        }
        if let Some(priority) = changes.priority.as_ref().filter(|p| !p.is_empty()) {
            issue.priority.clone_from(priority);
        }
        if let Some(labels) = &changes.labels {
            issue.labels.clone_from(labels);
        }
        issue.updated_at = now;
        Ok(())
    }
}

/// Remote state tokens a [`FakeProvider`] uses.
#[derive(Clone, Copy)]
pub struct States {
    pub open: &'static str,
    pub closed: &'static str,
}

pub const GITHUB_STATES: States = States { open: "open", closed: "closed" };
pub const JIRA_STATES: States = States { open: "new", closed: "done" };

/// In-memory remote tracker. New issues start open whatever state the
/// request carries, like both real remotes.
pub struct FakeProvider {
    id: &'static str,
    key_prefix: &'static str,
    states: States,
    clock: Arc<FixedClock>,
    issues: Mutex<BTreeMap<u32, RemoteIssue>>,
    failing: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn github(clock: Arc<FixedClock>) -> Self {
        Self::new("github", "", GITHUB_STATES, clock)
    }

    pub fn jira(clock: Arc<FixedClock>) -> Self {
        Self::new("jira", "PROJ-", JIRA_STATES, clock)
    }

    fn new(
        id: &'static str,
        key_prefix: &'static str,
        states: States,
        clock: Arc<FixedClock>,
    ) -> Self {
        Self {
            id,
            key_prefix,
            states,
            clock,
            issues: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adds a remote issue as if someone filed it upstream.
    pub fn seed(&self, number: u32, title: &str, state: &str, labels: &[&str], updated: DateTime<Utc>) {
        let issue = RemoteIssue {
            id: format!("{}{number}", self.key_prefix),
            title: title.to_string(),
            body: format!("Body of {title}"),
            state: state.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            issue_type: None,
            priority: None,
            created_at: updated,
            updated_at: updated,
        };
        self.issues.lock().unwrap().insert(number, issue);
    }

    /// Makes `<op>:<id>` (or `create`, `list`) fail.
    pub fn fail(&self, op: &str) {
        self.failing.lock().unwrap().insert(op.to_string());
    }

    pub fn issue(&self, id: &str) -> Option<RemoteIssue> {
        self.issues.lock().unwrap().values().find(|issue| issue.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn edit(&self, id: &str, change: impl FnOnce(&mut RemoteIssue)) {
        let mut issues = self.issues.lock().unwrap();
        if let Some(issue) = issues.values_mut().find(|issue| issue.id == id) {
            change(issue);
        }
    }

    fn enter(&self, op: String) -> Result<(), SyncError> {
        let failing = self.failing.lock().unwrap().contains(&op);
        self.calls.lock().unwrap().push(op.clone());
        if failing {
            return Err(SyncError::Command { command: op, exit_code: 1, stderr: "boom".into() });
        }
        Ok(())
    }

    fn set_state(&self, id: &str, state: &'static str) -> Result<(), SyncError> {
        let now = self.clock.now();
        let mut issues = self.issues.lock().unwrap();
        let issue = issues.values_mut().find(|issue| issue.id == id).ok_or_else(|| {
            SyncError::Command { command: id.to_string(), exit_code: 1, stderr: "not found".into() }
        })?;
        if issue.state == state {
            return Err(SyncError::Command {
                command: id.to_string(),
                exit_code: 1,
                stderr: format!("already {state}"),
            });
        }
        issue.state = state.to_string();
        issue.updated_at = now;
        Ok(())
    }
}

impl Provider for FakeProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        "Fake"
    }

    fn available<'a>(&'a self, _work_dir: &'a Path) -> ProviderFuture<'a, bool> {
        Box::pin(async move { Ok(true) })
    }

    fn list<'a>(&'a self, _work_dir: &'a Path) -> ProviderFuture<'a, Vec<RemoteIssue>> {
        Box::pin(async move {
            self.enter("list".into())?;
            Ok(self.issues.lock().unwrap().values().cloned().collect())
        })
    }

    fn create<'a>(
        &'a self,
        _work_dir: &'a Path,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            self.enter("create".into())?;
            let now = self.clock.now();
            let mut issues = self.issues.lock().unwrap();
            let number = issues.keys().next_back().map_or(1, |n| n + 1);
            let id = format!("{}{number}", self.key_prefix);
            let created = RemoteIssue {
                id: id.clone(),
                state: self.states.open.to_string(),
                created_at: now,
                updated_at: now,
                ..issue.clone()
            };
            issues.insert(number, created);
            Ok(id)
        })
    }

    fn update<'a>(
        &'a self,
        _work_dir: &'a Path,
        external_id: &'a str,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.enter(format!("update:{external_id}"))?;
            let now = self.clock.now();
            self.edit(external_id, |remote| {
                remote.title.clone_from(&issue.title);
                remote.body.clone_from(&issue.body);
                remote.labels.clone_from(&issue.labels);
                remote.issue_type.clone_from(&issue.issue_type);
                remote.priority.clone_from(&issue.priority);
                remote.updated_at = now;
            });
            Ok(())
        })
    }

    fn close<'a>(&'a self, _work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.enter(format!("close:{external_id}"))?;
            self.set_state(external_id, self.states.closed)
        })
    }

    fn reopen<'a>(&'a self, _work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.enter(format!("reopen:{external_id}"))?;
            self.set_state(external_id, self.states.open)
        })
    }
}

/// A context over the given fakes; git and shell are unreachable.
pub fn context(clock: Arc<FixedClock>, fs: Arc<MemFs>, tracker: Arc<FakeTracker>) -> ServiceContext {
    ServiceContext::from_ports(clock, fs, Arc::new(Unreachable), Arc::new(Unreachable), tracker)
}
