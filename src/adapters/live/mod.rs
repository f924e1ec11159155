//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod shell;
pub mod tracker;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use git::LiveGitRepo;
pub use shell::LiveShellExecutor;
pub use tracker::LiveLocalTracker;
