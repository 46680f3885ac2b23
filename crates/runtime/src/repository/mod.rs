//! Repository layer for recorded matches.
//!
//! A replay is the seed plus every command that went through the queue;
//! AI decisions are not stored because playback re-derives them.

mod error;
mod replay;

pub use error::RepositoryError;
pub use replay::{FileReplayRepository, InMemoryReplayRepository, ReplayRepository};
