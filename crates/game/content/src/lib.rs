//! Data-driven battle content and its loaders.
//!
//! Everything a match needs besides the seed lives in data files:
//! - Tile types (RON)
//! - Abilities (RON)
//! - Character templates (RON)
//! - Map definitions with generators and spawn lists (RON)
//! - Rule tunables (TOML)
//!
//! Loaded definitions are registered into a read-only
//! [`game_core::ContentRegistry`]; they never appear in battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ActorLoader, ConfigLoader, ContentFactory, MapDefinition, MapGenerator,
    MapLoader, NoiseRule, SpawnPoint, TileLoader,
};
