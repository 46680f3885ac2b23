//! Errors raised while registering or resolving content definitions.

use crate::error::{ErrorSeverity, GameError};

/// Content definition failures. These are load-time configuration faults.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("unknown tile type '{0}'")]
    UnknownTile(String),

    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("unknown character template '{0}'")]
    UnknownCharacter(String),

    #[error("{kind} '{name}' is defined more than once")]
    Duplicate { kind: &'static str, name: String },

    #[error("{kind} '{name}' is invalid: {reason}")]
    Invalid {
        kind: &'static str,
        name: String,
        reason: String,
    },
}

impl ContentError {
    pub(crate) fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }
}
