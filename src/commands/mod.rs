//! Command dispatch and handlers.

pub mod check;
pub mod status;
pub mod sync;

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::live::LiveFileSystem;
use crate::cli::{Cli, Command};
use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::sync::provider::{GitHubProvider, JiraProvider};
use crate::sync::{Provider, ProviderKind};

/// Environment variable naming a cassette file to record the run into.
pub const RECORD_ENV: &str = "ISSUESYNC_RECORD";

/// Dispatch a parsed command line to its handler.
///
/// When `ISSUESYNC_RECORD` is set to a file path, the git, shell and local
/// tracker interactions of the run are recorded into a cassette there.
///
/// # Errors
///
/// Returns an error string if configuration fails to load or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let work_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()
            .map_err(|e| format!("Failed to resolve current directory: {e}"))?,
    };
    let config = SyncConfig::load(&LiveFileSystem, &work_dir, cli.config.as_deref())?;

    let ctx = match env::var(RECORD_ENV) {
        Ok(path) if !path.is_empty() => {
            ServiceContext::recording(&config.td_bin, &PathBuf::from(path))
        }
        _ => ServiceContext::live(&config.td_bin),
    };

    let result = dispatch_with_context(cli, &ctx, &config, &work_dir);

    // Written even when the command failed.
    if let Some(path) = ctx.finish()? {
        eprintln!("Recording saved to: {}", path.display());
    }

    result
}

/// Dispatch a command with an explicit service context and configuration.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    cli: &Cli,
    ctx: &ServiceContext,
    config: &SyncConfig,
    work_dir: &Path,
) -> Result<(), String> {
    let state_dir = config.state_dir(work_dir);
    match &cli.command {
        Command::Check { provider } => check::run(ctx, config, work_dir, *provider),
        Command::Pull { provider } => {
            sync::run(ctx, config, work_dir, *provider, &sync::Pass::Pull, cli.verbose)
        }
        Command::Push { provider } => {
            sync::run(ctx, config, work_dir, *provider, &sync::Pass::Push, cli.verbose)
        }
        Command::PushOne { id, provider } => sync::run(
            ctx,
            config,
            work_dir,
            *provider,
            &sync::Pass::PushOne(id.clone()),
            cli.verbose,
        ),
        Command::Sync { provider } => {
            sync::run(ctx, config, work_dir, *provider, &sync::Pass::Both, cli.verbose)
        }
        Command::Status => status::run(ctx, &state_dir),
    }
}

/// Builds the provider for `kind` on top of the context's ports.
pub(crate) fn build_provider(
    ctx: &ServiceContext,
    config: &SyncConfig,
    kind: ProviderKind,
) -> Result<Box<dyn Provider>, String> {
    match kind {
        ProviderKind::GitHub => {
            Ok(Box::new(GitHubProvider::new(Arc::clone(&ctx.shell), Arc::clone(&ctx.git))))
        }
        ProviderKind::Jira => match JiraProvider::new(config.jira.clone()) {
            Ok(provider) => Ok(Box::new(provider)),
            Err(err) => Err(err.to_string()),
        },
    }
}

/// Runs `future` to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}
