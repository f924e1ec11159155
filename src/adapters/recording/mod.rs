//! Recording adapters that capture subprocess interactions to a cassette.

pub mod git;
pub mod shell;
pub mod tracker;

pub use git::RecordingGitRepo;
pub use shell::RecordingShellExecutor;
pub use tracker::RecordingLocalTracker;

use serde::Serialize;

use crate::cassette::recorder::SharedRecorder;

/// Records a plain (infallible) interaction.
pub(crate) fn record_value<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input = serde_json::to_value(input).unwrap_or_default();
    let output = serde_json::to_value(output).unwrap_or_default();
    push(recorder, port, method, input, output);
}

/// Records a `Result` interaction as `{"Ok": value}` or `{"Err": message}`.
///
/// Mirror of `replaying::replay_result`.
pub(crate) fn record_result<I, T, E>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    I: Serialize,
    T: Serialize,
    E: std::fmt::Display,
{
    let input = serde_json::to_value(input).unwrap_or_default();
    let output = match result {
        Ok(value) => serde_json::json!({ "Ok": serde_json::to_value(value).unwrap_or_default() }),
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };
    push(recorder, port, method, input, output);
}

fn push(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: serde_json::Value,
    output: serde_json::Value,
) {
    let mut guard = recorder.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.record(port, method, input, output);
}
