//! Binary entrypoint for the `issuesync` CLI.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    setup_logging();

    // Recording is handled in commands::dispatch via ISSUESYNC_RECORD=<file>.
    match issuesync::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_env("ISSUESYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
