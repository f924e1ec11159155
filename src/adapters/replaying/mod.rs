//! Replaying adapters that serve recorded interactions.

pub mod git;
pub mod shell;
pub mod tracker;

pub use git::ReplayingGitRepo;
pub use shell::ReplayingShellExecutor;
pub use tracker::ReplayingLocalTracker;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::SharedReplayer;
use crate::error::PortError;

/// Pulls the next recorded output for `port`/`method`.
pub(crate) fn next_output(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, PortError> {
    let mut guard = replayer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    Ok(guard.next_output(port, method)?)
}

/// Decodes an `{"Ok": value}` / `{"Err": message}` output.
///
/// Mirror of `recording::record_result`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
    context: &str,
) -> Result<T, PortError> {
    if let Some(message) = output.get("Err") {
        return Err(message.as_str().unwrap_or("unknown error").to_string().into());
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| format!("{context}: recorded output does not decode: {e}").into())
}
