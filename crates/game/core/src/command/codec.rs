//! Fixed binary layout for commands and replay files.
//!
//! Encoded with bincode's legacy configuration (fixed-width little-endian
//! integers, `u64` sequence lengths), which reproduces the layout exactly:
//!
//! ```text
//! command: i32 kind | u8 actor | i32 x | i32 y | u8 target | u8 ability   (15 bytes)
//! replay:  u32 seed | u64 count | count x command
//! ```

use crate::error::{ErrorSeverity, GameError};
use crate::state::{AbilityTarget, CharacterId, Position};

use super::{Command, CommandKind};

/// Failures while converting between bytes and commands.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("unknown command type {0}")]
    UnknownKind(i32),

    #[error("command has no acting character")]
    MissingActor,

    #[error("{0} command has no target character")]
    MissingTarget(CommandKind),
}

impl GameError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Protocol
    }
}

/// Raw command record, field for field as it appears on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WireCommand {
    pub kind: i32,
    pub actor: u8,
    pub x: i32,
    pub y: i32,
    pub target: u8,
    pub ability: u8,
}

impl WireCommand {
    pub const ENCODED_LEN: usize = 15;

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(CodecError::Length {
                expected: Self::ENCODED_LEN,
                actual: bytes.len(),
            });
        }
        bincode::deserialize(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

impl From<Command> for WireCommand {
    fn from(command: Command) -> Self {
        let mut wire = WireCommand {
            kind: command.kind() as i32,
            actor: command.actor().0,
            ..WireCommand::default()
        };
        match command {
            Command::Attack { target, .. } => wire.target = target.0,
            Command::Move { destination, .. } => {
                wire.x = destination.x;
                wire.y = destination.y;
            }
            Command::UseAbility { slot, target, .. } => {
                wire.ability = slot;
                match target {
                    AbilityTarget::Character(id) => wire.target = id.0,
                    AbilityTarget::Tile(tile) => {
                        wire.x = tile.x;
                        wire.y = tile.y;
                    }
                }
            }
            Command::Wait { .. } => {}
        }
        wire
    }
}

impl TryFrom<WireCommand> for Command {
    type Error = CodecError;

    fn try_from(wire: WireCommand) -> Result<Self, Self::Error> {
        let kind = CommandKind::from_repr(wire.kind).ok_or(CodecError::UnknownKind(wire.kind))?;
        let actor = CharacterId::from_wire(wire.actor).ok_or(CodecError::MissingActor)?;
        let target = CharacterId::from_wire(wire.target);
        let tile = Position::new(wire.x, wire.y);

        Ok(match kind {
            CommandKind::Attack => Command::Attack {
                actor,
                target: target.ok_or(CodecError::MissingTarget(kind))?,
            },
            CommandKind::Move => Command::Move {
                actor,
                destination: tile,
            },
            CommandKind::Ability => Command::UseAbility {
                actor,
                slot: wire.ability,
                target: target.map_or(AbilityTarget::Tile(tile), AbilityTarget::Character),
            },
            CommandKind::Wait => Command::Wait { actor },
        })
    }
}

impl Command {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        WireCommand::from(*self).encode()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        WireCommand::decode(bytes)?.try_into()
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ReplayRecord {
    seed: u32,
    commands: Vec<WireCommand>,
}

/// Seed plus every dispatched command, in dispatch order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayLog {
    pub seed: u32,
    pub commands: Vec<Command>,
}

impl ReplayLog {
    const HEADER_LEN: usize = 4 + 8;

    pub fn new(seed: u32, commands: Vec<Command>) -> Self {
        Self { seed, commands }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let record = ReplayRecord {
            seed: self.seed,
            commands: self.commands.iter().map(|&c| WireCommand::from(c)).collect(),
        };
        bincode::serialize(&record).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let record: ReplayRecord =
            bincode::deserialize(bytes).map_err(|e| CodecError::Serialization(e.to_string()))?;
        let expected = Self::HEADER_LEN + record.commands.len() * WireCommand::ENCODED_LEN;
        if bytes.len() != expected {
            return Err(CodecError::Length {
                expected,
                actual: bytes.len(),
            });
        }
        let commands = record
            .commands
            .into_iter()
            .map(Command::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            seed: record.seed,
            commands,
        })
    }
}
