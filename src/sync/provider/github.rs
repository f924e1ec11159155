//! GitHub Issues provider, driving the `gh` CLI.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Provider, ProviderFuture};
use crate::error::SyncError;
use crate::model::{null_as_default, RemoteIssue};
use crate::ports::{GitRepo, ShellExecutor, ShellOutput};

/// Provider ID of GitHub.
pub const PROVIDER_ID: &str = "github";

const GH: &str = "gh";
const ISSUE_FIELDS: &str = "number,title,body,state,labels,updatedAt,createdAt";
const LIST_LIMIT: &str = "200";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    body: String,
    state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    labels: Vec<GhLabel>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

impl From<GhIssue> for RemoteIssue {
    fn from(issue: GhIssue) -> Self {
        Self {
            id: issue.number.to_string(),
            title: issue.title,
            body: issue.body,
            state: issue.state.to_ascii_lowercase(),
            labels: issue.labels.into_iter().map(|label| label.name).collect(),
            issue_type: None,
            priority: None,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// GitHub Issues of the repository behind the working directory's
/// `origin` remote.
pub struct GitHubProvider {
    shell: Arc<dyn ShellExecutor>,
    git: Arc<dyn GitRepo>,
}

impl GitHubProvider {
    /// Creates a provider that runs `gh` through `shell`.
    pub fn new(shell: Arc<dyn ShellExecutor>, git: Arc<dyn GitRepo>) -> Self {
        Self { shell, git }
    }

    fn gh(&self, work_dir: &Path, args: Vec<String>) -> Result<ShellOutput, SyncError> {
        debug!(provider = PROVIDER_ID, args = ?args, "running gh");
        let output = self
            .shell
            .run(GH, &args, work_dir)
            .map_err(|source| SyncError::Spawn { program: GH.to_string(), source })?;
        if !output.success() {
            return Err(SyncError::Command {
                command: command_line(&args),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Names of the labels that exist in the repository. Best effort: a
    /// failed lookup means no labels get applied.
    fn repo_labels(&self, work_dir: &Path) -> HashSet<String> {
        let args = strings(&["label", "list", "--json", "name", "--limit", LIST_LIMIT]);
        let labels = self.gh(work_dir, args).and_then(|output| {
            serde_json::from_str::<Vec<GhLabel>>(&output.stdout)
                .map_err(|source| SyncError::Parse { what: "gh label list output".into(), source })
        });
        match labels {
            Ok(labels) => labels.into_iter().map(|label| label.name).collect(),
            Err(err) => {
                warn!(provider = PROVIDER_ID, error = %err, "could not list repository labels");
                HashSet::new()
            }
        }
    }

    fn existing_labels<'l>(&self, work_dir: &Path, wanted: &'l [String]) -> Vec<&'l String> {
        if wanted.is_empty() {
            return Vec::new();
        }
        let available = self.repo_labels(work_dir);
        let (kept, dropped): (Vec<_>, Vec<_>) =
            wanted.iter().partition(|label| available.contains(label.as_str()));
        if !dropped.is_empty() {
            debug!(provider = PROVIDER_ID, dropped = ?dropped, "skipping labels missing from repo");
        }
        kept
    }
}

impl Provider for GitHubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn available<'a>(&'a self, work_dir: &'a Path) -> ProviderFuture<'a, bool> {
        Box::pin(async move {
            if self.shell.find_program(GH).is_none() {
                debug!(provider = PROVIDER_ID, "gh not found on PATH");
                return Ok(false);
            }
            match self.git.remote_url(work_dir, "origin") {
                Ok(url) => Ok(url.contains("github.com")),
                Err(err) => {
                    debug!(provider = PROVIDER_ID, error = %err, "no origin remote");
                    Ok(false)
                }
            }
        })
    }

    fn list<'a>(&'a self, work_dir: &'a Path) -> ProviderFuture<'a, Vec<RemoteIssue>> {
        Box::pin(async move {
            let args = strings(&[
                "issue", "list", "--json", ISSUE_FIELDS, "--limit", LIST_LIMIT, "--state", "all",
            ]);
            let output = self.gh(work_dir, args)?;
            let issues: Vec<GhIssue> = serde_json::from_str(&output.stdout)
                .map_err(|source| SyncError::Parse {
                    what: "gh issue list output".into(),
                    source,
                })?;
            Ok(issues.into_iter().map(RemoteIssue::from).collect())
        })
    }

    fn create<'a>(
        &'a self,
        work_dir: &'a Path,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let mut args = strings(&[
                "issue",
                "create",
                "--title",
                issue.title.as_str(),
                "--body",
                issue.body.as_str(),
            ]);
            for label in self.existing_labels(work_dir, &issue.labels) {
                args.push("--label".into());
                args.push(label.clone());
            }
            let output = self.gh(work_dir, args)?;
            parse_issue_number(&output.stdout).ok_or_else(|| SyncError::Command {
                command: "gh issue create".into(),
                exit_code: output.exit_code,
                stderr: format!("no issue URL in output: {}", output.stdout.trim()),
            })
        })
    }

    fn update<'a>(
        &'a self,
        work_dir: &'a Path,
        external_id: &'a str,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            let mut args = strings(&[
                "issue",
                "edit",
                external_id,
                "--title",
                issue.title.as_str(),
                "--body",
                issue.body.as_str(),
            ]);
            for label in self.existing_labels(work_dir, &issue.labels) {
                args.push("--add-label".into());
                args.push(label.clone());
            }
            self.gh(work_dir, args).map(drop)
        })
    }

    fn close<'a>(&'a self, work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.gh(work_dir, strings(&["issue", "close", external_id])).map(drop)
        })
    }

    fn reopen<'a>(&'a self, work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(
            async move { self.gh(work_dir, strings(&["issue", "reopen", external_id])).map(drop) },
        )
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

/// `gh issue edit 42` style summary used in error messages.
fn command_line(args: &[String]) -> String {
    let words: Vec<&str> = args
        .iter()
        .take_while(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .collect();
    format!("{GH} {}", words.join(" "))
}

/// The issue number at the end of the URL `gh issue create` prints.
fn parse_issue_number(stdout: &str) -> Option<String> {
    let url = stdout.lines().map(str::trim).rfind(|line| !line.is_empty())?;
    let number = url.trim_end_matches('/').rsplit('/').next()?;
    (!number.is_empty() && number.bytes().all(|b| b.is_ascii_digit())).then(|| number.to_string())
}
