//! Observable outcomes of engine steps.
//!
//! The engine only appends to its event list; the runtime drains it after
//! every [`super::GameEngine::advance`] and forwards the events to
//! presentation and the network bridge.

use crate::command::Command;
use crate::env::AbilityId;
use crate::state::{CharacterId, PlayerId, Position, StatusEffectKind};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    TurnStarted {
        character: CharacterId,
    },
    /// The active character needs a command from `owner`.
    AwaitingInput {
        character: CharacterId,
        owner: PlayerId,
    },
    CommandDispatched(Command),
    Moved {
        character: CharacterId,
        to: Position,
    },
    /// Positive `amount` is damage, negative is healing.
    Damaged {
        character: CharacterId,
        amount: i32,
        hp: i32,
        killed: bool,
    },
    StatusApplied {
        character: CharacterId,
        kind: StatusEffectKind,
        duration: i32,
    },
    StatusExpired {
        character: CharacterId,
        kind: StatusEffectKind,
    },
    AbilityStarted {
        character: CharacterId,
        ability: AbilityId,
    },
    /// The visual effect of an ability reached its delay.
    AbilityEffect {
        character: CharacterId,
        ability: AbilityId,
    },
    /// A dead character lost one more HP on its turn.
    Decayed {
        character: CharacterId,
        hp: i32,
    },
    CharacterRemoved {
        character: CharacterId,
    },
    TurnEnded {
        character: CharacterId,
        residual_ct: i32,
    },
}
