//! Read-only content and deterministic randomness.
//!
//! Definitions (tile types, abilities, character templates) live in a
//! [`ContentRegistry`] that is filled at load time and handed by reference to
//! the engine. The match RNG is the only other input the rules consume.
mod abilities;
mod actors;
mod error;
mod registry;
mod rng;
mod tiles;

pub use abilities::{AbilityDefinition, AbilityId, AnimType, AppliedStatus};
pub use actors::CharacterTemplate;
pub use error::ContentError;
pub use registry::ContentRegistry;
pub use rng::{PcgRng, RandomSource};
pub use tiles::TileDefinition;
