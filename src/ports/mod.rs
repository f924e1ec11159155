//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the sync engine and an
//! external system (time, filesystem, git, subprocesses, the local
//! tracker). Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod shell;
pub mod tracker;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use git::GitRepo;
pub use shell::{ShellExecutor, ShellOutput};
pub use tracker::{IssueChanges, LocalTracker, NewLocalIssue};
