//! Content loaders for reading game data from files.
//!
//! Each loader parses one file into game-core definition types; the
//! [`ContentFactory`] ties them together for a data directory.

pub mod abilities;
pub mod actors;
pub mod config;
pub mod factory;
pub mod map;
mod noise;
pub mod tiles;

pub use abilities::AbilityLoader;
pub use actors::ActorLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use map::{MapDefinition, MapGenerator, MapLoader, NoiseRule, SpawnPoint};
pub use tiles::TileLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
