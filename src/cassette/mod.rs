//! Cassettes: recorded subprocess interactions that can be replayed.
//!
//! A sync run started with `ISSUESYNC_RECORD=<file>` writes every `gh`,
//! `git` and `td` call it makes into a YAML cassette. Replaying that
//! cassette reproduces the run without touching the real tools.

pub mod format;
pub mod recorder;
pub mod replayer;
