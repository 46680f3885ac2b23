//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the session layer, repositories and the engine so
//! clients can bubble them up with consistent context.
use thiserror::Error;

use game_core::{CodecError, EngineError, ErrorSeverity, GameError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failures of the match session and its wire messages.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Connecting to the host failed; the session stays in join setup.
    #[error("Join failed.")]
    JoinFailed,

    #[error("session is full ({max} players)")]
    Full { max: u8 },

    #[error("no connection is open")]
    NotConnected,

    #[error("connection {0} is closed")]
    ConnectionClosed(u8),

    #[error("empty session message")]
    EmptyMessage,

    #[error("unknown session message id {0}")]
    UnknownMessage(u8),

    #[error("session message {id} is truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        id: u8,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl GameError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::JoinFailed | SessionError::Full { .. } => ErrorSeverity::Recoverable,
            SessionError::NotConnected | SessionError::ConnectionClosed(_) => {
                ErrorSeverity::Recoverable
            }
            SessionError::EmptyMessage
            | SessionError::UnknownMessage(_)
            | SessionError::Truncated { .. }
            | SessionError::Codec(_) => ErrorSeverity::Protocol,
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires {0} to be configured before building")]
    Missing(&'static str),

    #[error("replay was recorded with seed {replay} but the battle was built from seed {battle}")]
    ReplaySeedMismatch { replay: u32, battle: u32 },

    #[error("input provider channel closed")]
    InputChannelClosed,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
