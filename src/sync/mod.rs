//! Bidirectional issue sync.
//!
//! - [`mapper`] translates fields between local and remote issues.
//! - [`provider`] talks to the remote trackers.
//! - [`state`] persists which local issue is paired with which remote one.
//! - [`engine`] runs the pull and push passes.

pub mod engine;
pub mod mapper;
pub mod provider;
pub mod state;

pub use engine::SyncEngine;
pub use mapper::Mapper;
pub use provider::{Provider, ProviderKind};
pub use state::{load_state, save_state, SyncState, SyncStateEntry};
