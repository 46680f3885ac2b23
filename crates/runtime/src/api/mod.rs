//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on the session, the driver or persistence.

pub mod errors;
pub mod providers;

pub use errors::{Result, RuntimeError, SessionError};
pub use providers::{ChannelInputProvider, CommandSender, InputProvider, WaitInputProvider};
