//! Runtime orchestration for the deterministic battle simulation.
//!
//! This crate wires the engine from `game-core` to input providers, the
//! peer-to-peer session, replay persistence and an event bus. Consumers embed
//! [`Runtime`] to drive a match tick by tick and subscribe to its events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the fixed-tick driver and its builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`session`] and [`net`] carry the host/join handshake and command relay
//! - [`repository`] stores replays
pub mod api;
pub mod events;
pub mod net;
pub mod repository;
pub mod runtime;
pub mod session;

pub use api::{
    ChannelInputProvider, CommandSender, InputProvider, Result, RuntimeError, SessionError,
    WaitInputProvider,
};
pub use events::{Event, EventBus, MatchOutcome, SessionEvent, Topic};
pub use net::{Connection, LocalConnection, LocalNetwork};
pub use repository::{
    FileReplayRepository, InMemoryReplayRepository, RepositoryError, ReplayRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::{JoinState, Session, SessionSignal, SessionState};
