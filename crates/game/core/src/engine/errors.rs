//! Error types for command dispatch and turn scheduling.

#[cfg(feature = "serde")]
use crate::command::CodecError;
use crate::command::Command;
use crate::env::AbilityId;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{CharacterId, Position};

/// Reasons a command cannot be dispatched against the current state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("character {0} does not exist")]
    UnknownCharacter(CharacterId),

    #[error("character {actor} is not the active character (active: {active:?})")]
    NotActive {
        actor: CharacterId,
        active: Option<CharacterId>,
    },

    #[error("no character is waiting for a command")]
    NotAwaitingInput,

    #[error("an action is still playing out")]
    Busy,

    #[error("character {0} is dead")]
    Dead(CharacterId),

    #[error("tile {0} is not reachable this turn")]
    NotReachable(Position),

    #[error("no path to {0}")]
    NoPath(Position),

    #[error("character {0} cannot be attacked")]
    InvalidTarget(CharacterId),

    #[error("tile {0} is out of range")]
    OutOfRange(Position),

    #[error("no ability in slot {slot}")]
    NoAbility { slot: u8 },

    #[error("ability {0:?} is not registered")]
    UnknownAbility(AbilityId),
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CommandError::Busy | CommandError::NotAwaitingInput => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }
}

/// A peer or replay file sent something the local state cannot accept.
///
/// Locally produced commands are validated before they are queued, so a
/// rejection at dispatch time always means the streams have diverged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "serde")]
    #[error("malformed command: {0}")]
    Codec(#[from] CodecError),

    #[error("command `{command}` rejected: {source}")]
    Rejected {
        command: Command,
        source: CommandError,
    },
}

impl GameError for ProtocolError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Protocol
    }
}

/// Errors that can occur while picking the next turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no characters are left on the map")]
    NoCharacters,

    #[error("no character gains CT")]
    Stalled,
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }
}

/// Anything [`super::GameEngine::advance`] can fail with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Protocol(error) => error.severity(),
            EngineError::Turn(error) => error.severity(),
        }
    }
}
