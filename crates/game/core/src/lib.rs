//! Deterministic rules for tile-based tactical battles.
//!
//! `game-core` owns the canonical battle model (grid, characters, status
//! effects), pathfinding, combat arithmetic, the CT turn scheduler, the
//! command model and its wire codec, and the utility AI. All state mutation
//! during a match flows through [`engine::GameEngine`]; the runtime and
//! content crates depend on the types re-exported here.
pub mod ai;
pub mod combat;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod pathfinding;
pub mod state;

pub use ai::{Behavior, Decision};
#[cfg(feature = "serde")]
pub use command::{CodecError, ReplayLog, WireCommand};
pub use command::{Command, CommandKind, CommandQueue, QueueMode};
pub use config::GameConfig;
pub use engine::{BattleEvent, CommandError, EngineError, GameEngine, ProtocolError, TurnError};
pub use env::{
    AbilityDefinition, AbilityId, AnimType, CharacterTemplate, ContentError, ContentRegistry,
    PcgRng, RandomSource, TileDefinition,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    AbilityTarget, BattleState, Character, CharacterId, Controller, Grid, MapDimensions,
    PlacementError, PlayerId, Position, Stats, StatusEffectKind, TagSet, Tile, TileFlags,
    TileTypeId, TurnState,
};
