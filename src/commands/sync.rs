//! `issuesync pull`, `push`, `push-one` and `sync` commands.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::commands::{block_on, build_provider};
use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::error::SyncError;
use crate::model::SyncResult;
use crate::sync::{Provider, ProviderKind, SyncEngine};

/// Which passes a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pass {
    /// Remote to local.
    Pull,
    /// Local to remote.
    Push,
    /// A single local issue to remote.
    PushOne(String),
    /// Pull, then push.
    Both,
}

/// Execute a sync command against the provider `kind`.
///
/// Prints the summary line, and with `verbose` every per-issue error.
///
/// # Errors
///
/// Returns an error string if the provider is unavailable, a pass fails
/// outright, or the sync state cannot be saved.
pub fn run(
    ctx: &ServiceContext,
    config: &SyncConfig,
    work_dir: &Path,
    kind: ProviderKind,
    pass: &Pass,
    verbose: bool,
) -> Result<(), String> {
    let provider = build_provider(ctx, config, kind)?;
    let mapper = kind.mapper();
    let state_dir = config.state_dir(work_dir);
    let engine = SyncEngine::new(ctx, provider.as_ref(), mapper.as_ref(), work_dir, state_dir);

    let outcome = block_on(async {
        ensure_available(provider.as_ref(), work_dir).await?;
        execute(&engine, pass).await
    })?;

    match outcome {
        Ok(result) => {
            print!("{}", report(&result, verbose));
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.partial_result() {
                print!("{}", report(partial, verbose));
            }
            Err(err.to_string())
        }
    }
}

/// Fails with [`SyncError::Unavailable`] unless the provider reports itself
/// usable from `work_dir`.
///
/// # Errors
///
/// Returns the provider's own error, or `Unavailable` when it answers no.
pub async fn ensure_available(provider: &dyn Provider, work_dir: &Path) -> Result<(), SyncError> {
    if provider.available(work_dir).await? {
        Ok(())
    } else {
        Err(SyncError::Unavailable { provider: provider.id(), dir: work_dir.to_path_buf() })
    }
}

/// Runs the passes named by `pass`.
///
/// # Errors
///
/// Returns the first pass-level failure. Per-issue failures are collected
/// in the result instead.
pub async fn execute(engine: &SyncEngine<'_>, pass: &Pass) -> Result<SyncResult, SyncError> {
    match pass {
        Pass::Pull => engine.pull().await,
        Pass::Push => engine.push().await,
        Pass::PushOne(id) => engine.push_one(id).await,
        Pass::Both => {
            let pulled = engine.pull().await?;
            info!(pulled = pulled.pulled, "pull finished, pushing");
            let pushed = engine.push().await?;
            let mut errors = pulled.errors;
            errors.extend(pushed.errors);
            Ok(SyncResult { pulled: pulled.pulled, pushed: pushed.pushed, errors })
        }
    }
}

/// Renders the summary line, followed by the errors when `verbose`.
#[must_use]
pub fn report(result: &SyncResult, verbose: bool) -> String {
    let mut out = format!("{}\n", result.summary());
    if verbose {
        for err in &result.errors {
            let _ = writeln!(out, "  {err}");
        }
    }
    out
}
