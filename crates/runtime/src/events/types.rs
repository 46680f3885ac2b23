//! Event types for the session topic.

use serde::{Deserialize, Serialize};

use game_core::{CharacterId, Command, PlayerId};

use crate::session::SessionState;

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The local player's characters are the last ones standing.
    Victory { winner: PlayerId },
    /// Another player's characters are the last ones standing.
    Defeat { winner: PlayerId },
    /// Every character died in the same exchange.
    Draw,
    /// A recorded match finished playing back.
    ReplayOver { winner: Option<PlayerId> },
    /// The match ended early: a peer left or sent a rejected command.
    Abandoned { reason: String },
}

/// Lifecycle events of the session and the driver around the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    PlayerJoined {
        connection: u8,
    },
    PeerDropped {
        reason: String,
    },
    /// The host told this peer that one of its characters is up.
    TurnAlert {
        character: CharacterId,
    },
    /// A local command failed validation and was not queued.
    CommandRejected {
        command: Command,
        reason: String,
    },
    /// A textual notice for the player, such as "Join failed.".
    Notice(String),
    MatchEnded(MatchOutcome),
    ReplaySaved {
        commands: usize,
    },
}
