//! Live adapter for the local tracker port, driving the `td` CLI.

use std::path::Path;
use std::sync::Arc;

use crate::error::{PortError, SyncError};
use crate::model::LocalIssue;
use crate::ports::shell::{ShellExecutor, ShellOutput};
use crate::ports::tracker::{IssueChanges, LocalTracker, NewLocalIssue};

/// Local tracker backed by the `td` command-line tool.
pub struct LiveLocalTracker {
    binary: String,
    shell: Arc<dyn ShellExecutor>,
}

impl LiveLocalTracker {
    /// Creates a tracker that runs `binary` through `shell`.
    pub fn new(binary: impl Into<String>, shell: Arc<dyn ShellExecutor>) -> Self {
        Self { binary: binary.into(), shell }
    }

    fn exec(&self, dir: &Path, args: Vec<String>) -> Result<ShellOutput, PortError> {
        let output = self
            .shell
            .run(&self.binary, &args, dir)
            .map_err(|source| SyncError::Spawn { program: self.binary.clone(), source })?;
        if !output.success() {
            return Err(Box::new(SyncError::Command {
                command: format!("{} {}", self.binary, args.first().map_or("", String::as_str)),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            }));
        }
        Ok(output)
    }
}

impl LocalTracker for LiveLocalTracker {
    fn list(&self, dir: &Path) -> Result<Vec<LocalIssue>, PortError> {
        let output = self.exec(dir, vec!["list".into(), "--json".into()])?;
        if output.stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&output.stdout).map_err(|source| {
            SyncError::Parse { what: format!("{} list output", self.binary), source }.into()
        })
    }

    fn show(&self, dir: &Path, id: &str) -> Result<LocalIssue, PortError> {
        let output =
            self.exec(dir, vec!["show".into(), id.to_string(), "-f".into(), "json".into()])?;
        serde_json::from_str(&output.stdout)
            .map_err(|source| SyncError::Parse { what: format!("issue {id}"), source }.into())
    }

    fn create(&self, dir: &Path, issue: &NewLocalIssue) -> Result<String, PortError> {
        let output = self.exec(dir, create_args(issue))?;
        parse_created_id(&output.stdout)
            .ok_or_else(|| format!("no issue ID in {} create output", self.binary).into())
    }

    fn update(&self, dir: &Path, id: &str, changes: &IssueChanges) -> Result<(), PortError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.exec(dir, update_args(id, changes))?;
        Ok(())
    }
}

fn create_args(issue: &NewLocalIssue) -> Vec<String> {
    let mut args = vec!["create".to_string(), issue.title.clone()];
    for (flag, value) in [
        ("--description", &issue.description),
        ("--type", &issue.issue_type),
        ("--priority", &issue.priority),
    ] {
        if !value.is_empty() {
            args.push(flag.to_string());
            args.push(value.clone());
        }
    }
    if !issue.labels.is_empty() {
        args.push("--labels".to_string());
        args.push(issue.labels.join(","));
    }
    args
}

fn update_args(id: &str, changes: &IssueChanges) -> Vec<String> {
    let mut args = vec!["update".to_string(), id.to_string()];
    let mut push = |flag: &str, value: String| {
        args.push(flag.to_string());
        args.push(value);
    };
    if let Some(title) = &changes.title {
        push("--title", title.clone());
    }
    if let Some(description) = &changes.description {
        push("--description", description.clone());
    }
    if let Some(status) = changes.status {
        push("--status", status.as_str().to_string());
    }
    if let Some(issue_type) = changes.issue_type.as_ref().filter(|t| !t.is_empty()) {
        push("--type", issue_type.clone());
    }
    if let Some(priority) = changes.priority.as_ref().filter(|p| !p.is_empty()) {
        push("--priority", priority.clone());
    }
    if let Some(labels) = &changes.labels {
        push("--labels", labels.join(","));
    }
    args
}

/// Extracts the new issue ID from `td create` output: the first token
/// starting with `td-`, or else the last whitespace-separated token.
fn parse_created_id(stdout: &str) -> Option<String> {
    fn trim(token: &str) -> &str {
        token.trim_matches(|c: char| matches!(c, ':' | ',' | '.' | '(' | ')'))
    }
    stdout
        .split_whitespace()
        .find(|token| trim(token).starts_with("td-"))
        .or_else(|| stdout.split_whitespace().last())
        .map(|token| trim(token).to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::model::Status;

    /// Scripted executor that records every call.
    struct ScriptedShell {
        outputs: Mutex<Vec<ShellOutput>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedShell {
        fn new(outputs: Vec<ShellOutput>) -> Arc<Self> {
            Arc::new(Self { outputs: Mutex::new(outputs), calls: Mutex::new(Vec::new()) })
        }
    }

    impl ShellExecutor for ScriptedShell {
        fn run(
            &self,
            program: &str,
            args: &[String],
            _dir: &Path,
        ) -> Result<ShellOutput, PortError> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            self.calls.lock().unwrap().push(call);
            Ok(self.outputs.lock().unwrap().remove(0))
        }

        fn find_program(&self, _program: &str) -> Option<PathBuf> {
            None
        }
    }

    fn ok(stdout: &str) -> ShellOutput {
        ShellOutput { exit_code: 0, stdout: stdout.to_string(), stderr: String::new() }
    }

    #[test]
    fn parse_created_id_prefers_td_token() {
        assert_eq!(parse_created_id("Created td-a1b2c3: Fix bug\n").as_deref(), Some("td-a1b2c3"));
        assert_eq!(parse_created_id("created issue 1234\n").as_deref(), Some("1234"));
        assert_eq!(parse_created_id("   \n"), None);
    }

    #[test]
    fn create_passes_only_non_empty_fields() {
        let shell = ScriptedShell::new(vec![ok("CREATED td-9f\n")]);
        let tracker = LiveLocalTracker::new("td", shell.clone());

        let id = tracker
            .create(
                Path::new("/proj"),
                &NewLocalIssue {
                    title: "Fix login".into(),
                    issue_type: "bug".into(),
                    labels: vec!["frontend".into(), "ui".into()],
                    ..NewLocalIssue::default()
                },
            )
            .unwrap();

        assert_eq!(id, "td-9f");
        let calls = shell.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            vec!["td", "create", "Fix login", "--type", "bug", "--labels", "frontend,ui"]
        );
    }

    #[test]
    fn update_sends_status_and_labels() {
        let shell = ScriptedShell::new(vec![ok("")]);
        let tracker = LiveLocalTracker::new("td", shell.clone());

        let changes = IssueChanges {
            status: Some(Status::Closed),
            labels: Some(vec!["gh:#42".into()]),
            ..IssueChanges::default()
        };
        tracker.update(Path::new("/proj"), "td-1", &changes).unwrap();

        let calls = shell.calls.lock().unwrap();
        assert_eq!(calls[0], vec!["td", "update", "td-1", "--status", "closed", "--labels", "gh:#42"]);
    }

    #[test]
    fn empty_update_runs_nothing() {
        let shell = ScriptedShell::new(Vec::new());
        let tracker = LiveLocalTracker::new("td", shell.clone());
        tracker.update(Path::new("/proj"), "td-1", &IssueChanges::default()).unwrap();
        assert!(shell.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn non_zero_exit_surfaces_stderr() {
        let shell = ScriptedShell::new(vec![ShellOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "issue td-404 not found\n".into(),
        }]);
        let tracker = LiveLocalTracker::new("td", shell);

        let err = tracker.show(Path::new("/proj"), "td-404").unwrap_err();
        assert!(err.to_string().contains("issue td-404 not found"));
    }

    #[test]
    fn list_parses_json_array() {
        let shell = ScriptedShell::new(vec![ok(
            r#"[{"id":"td-1","title":"A","status":"open","updated_at":"2025-01-01T00:00:00Z"}]"#,
        )]);
        let tracker = LiveLocalTracker::new("td", shell);

        let issues = tracker.list(Path::new("/proj")).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "td-1");
    }
}
