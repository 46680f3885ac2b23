//! Value types that make up the battle state.
mod character;
mod common;
mod stats;
mod status;
mod tags;
mod tile;

pub use character::{
    AbilityTarget, ActionState, AnimTimings, Character, Controller, DamageAffinities,
    PendingAbility,
};
pub use common::{CardinalDirection, CharacterId, PlayerId, Position};
pub use stats::{Equipment, StatKind, Stats};
pub use status::{StatusEffect, StatusEffectKind, StatusEffects};
pub use tags::TagSet;
pub use tile::{Tile, TileFlags, TileTypeId};
