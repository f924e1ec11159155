//! Port implementations.
//!
//! - `live`: real clock, disk, processes.
//! - `recording`: wraps a live adapter and writes each call to a cassette.
//! - `replaying`: answers calls from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
