//! `issuesync status` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::context::ServiceContext;
use crate::ports::FileSystem;
use crate::sync::state::LEGACY_STATE_FILE;
use crate::sync::load_state;

const STATE_SUFFIX: &str = "-sync.json";

/// Execute the `status` command.
///
/// Displays a table of the sync state files in `state_dir`: provider,
/// number of paired issues, and when the most recent pairing was recorded.
///
/// # Errors
///
/// Returns an error string if the state directory or a state file cannot
/// be read.
pub fn run(ctx: &ServiceContext, state_dir: &Path) -> Result<(), String> {
    print!("{}", render(ctx.fs.as_ref(), state_dir)?);
    Ok(())
}

/// Builds the status table. Never writes; a legacy file is only reported.
///
/// # Errors
///
/// Returns an error string if the state directory or a state file cannot
/// be read.
pub fn render(fs: &dyn FileSystem, state_dir: &Path) -> Result<String, String> {
    if !fs.exists(state_dir) {
        return Ok(format!("No sync state in {}.\n", state_dir.display()));
    }
    let mut names = fs
        .list_dir(state_dir)
        .map_err(|e| format!("Failed to list {}: {e}", state_dir.display()))?;
    names.sort();

    let mut legacy = false;
    let mut rows: Vec<(String, String, String)> = Vec::new();
    for name in &names {
        if name == LEGACY_STATE_FILE {
            legacy = true;
            continue;
        }
        let Some(provider) = name.strip_suffix(STATE_SUFFIX) else {
            continue;
        };
        let state = load_state(fs, state_dir, provider).map_err(|e| e.to_string())?;
        let last = state
            .issues
            .values()
            .map(|entry| entry.local_updated_at)
            .max()
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        rows.push((provider.to_string(), state.issues.len().to_string(), last));
    }

    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No providers synced yet.\n");
    } else {
        let provider_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(8).max(8);
        let issues_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(6).max(6);

        let _ = writeln!(
            out,
            "{:<provider_width$}  {:>issues_width$}  LAST SYNC",
            "PROVIDER", "ISSUES"
        );
        let _ = writeln!(out, "{:-<provider_width$}  {:->issues_width$}  {:-<16}", "", "", "");
        for (provider, issues, last) in &rows {
            let _ = writeln!(out, "{provider:<provider_width$}  {issues:>issues_width$}  {last}");
        }
        let _ = writeln!(out, "\n{} provider(s) synced.", rows.len());
    }
    if legacy {
        let _ = writeln!(out, "Legacy {LEGACY_STATE_FILE} found; migrated on next GitHub sync.");
    }
    Ok(out)
}
