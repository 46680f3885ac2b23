//! Common error infrastructure for game-core.
//!
//! Domain errors (`CommandError`, `ProtocolError`, `ContentError`, ...) are
//! defined next to the code that raises them. This module holds what they
//! share: a severity classification the runtime routes recovery on.
//!
//! Expected negative outcomes (no path, no valid target, an empty reachable
//! set) are not errors. They come back as empty collections or `None`.

/// Severity level of an error, used to choose a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller may retry with a different choice (e.g. another tile).
    Recoverable,

    /// The input is malformed and must not be retried unchanged.
    Validation,

    /// A trusted peer or replay file contradicted the local state.
    Protocol,

    /// Unrecoverable: broken content or corrupted state.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Protocol => "protocol",
            Self::Fatal => "fatal",
        }
    }
}

/// Common trait for all game-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;
}
