//! Error types raised by repository implementations.

use thiserror::Error;

use game_core::CodecError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("replay repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted replay: {0}")]
    Corrupted(#[from] CodecError),
}
