//! Commands: the only inputs that change a battle from outside the engine.
//!
//! A command names characters, tiles and abilities by stable indices
//! ([`CharacterId`], [`Position`], ability slot) so the same value can be
//! queued locally, sent to a peer, or written to a replay and resolved again
//! against any copy of the same battle.

#[cfg(feature = "serde")]
pub mod codec;
mod queue;

#[cfg(feature = "serde")]
pub use codec::{CodecError, ReplayLog, WireCommand};
pub use queue::{CommandQueue, QueueMode};

use crate::state::{AbilityTarget, CharacterId, Position};

/// Wire discriminant of a command.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::FromRepr,
)]
#[repr(i32)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    Attack = 0,
    Move = 1,
    Ability = 2,
    Wait = 3,
}

/// A player or AI intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Start a basic attack on `target`.
    Attack {
        actor: CharacterId,
        target: CharacterId,
    },
    /// Walk to `destination` along the cheapest path.
    Move {
        actor: CharacterId,
        destination: Position,
    },
    /// Use the ability in `slot` of the actor's ability list. Slots past the
    /// end of the list mean "no ability" and fail validation.
    UseAbility {
        actor: CharacterId,
        slot: u8,
        target: AbilityTarget,
    },
    /// End the turn with the wait residual.
    Wait { actor: CharacterId },
}

impl Command {
    pub fn actor(&self) -> CharacterId {
        match *self {
            Command::Attack { actor, .. }
            | Command::Move { actor, .. }
            | Command::UseAbility { actor, .. }
            | Command::Wait { actor } => actor,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Attack { .. } => CommandKind::Attack,
            Command::Move { .. } => CommandKind::Move,
            Command::UseAbility { .. } => CommandKind::Ability,
            Command::Wait { .. } => CommandKind::Wait,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Attack { actor, target } => write!(f, "{actor} attacks {target}"),
            Command::Move { actor, destination } => write!(f, "{actor} moves to {destination}"),
            Command::UseAbility {
                actor,
                slot,
                target: AbilityTarget::Character(target),
            } => write!(f, "{actor} uses ability {slot} on {target}"),
            Command::UseAbility {
                actor,
                slot,
                target: AbilityTarget::Tile(tile),
            } => write!(f, "{actor} uses ability {slot} at {tile}"),
            Command::Wait { actor } => write!(f, "{actor} waits"),
        }
    }
}
