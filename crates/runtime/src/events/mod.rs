//! Topic-based event bus for runtime events.
//!
//! Engine events and session events are published to separate topics so a
//! renderer can follow the battle while a lobby only follows the session.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{MatchOutcome, SessionEvent};
