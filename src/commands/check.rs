//! `issuesync check` command.

use std::path::Path;

use crate::commands::sync::ensure_available;
use crate::commands::{block_on, build_provider};
use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::sync::ProviderKind;

/// Execute the `check` command.
///
/// # Errors
///
/// Returns an error string if the provider is not configured, not reachable,
/// or not usable from `work_dir`.
pub fn run(
    ctx: &ServiceContext,
    config: &SyncConfig,
    work_dir: &Path,
    kind: ProviderKind,
) -> Result<(), String> {
    let provider = build_provider(ctx, config, kind)?;
    block_on(ensure_available(provider.as_ref(), work_dir))?.map_err(|e| e.to_string())?;
    println!("{} is available in {}", provider.name(), work_dir.display());
    Ok(())
}
