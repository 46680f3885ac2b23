//! Network bridge: the connection abstraction and the session wire messages.
//!
//! Transport internals stay behind [`Connection`]; the session only ever
//! sees whole message payloads tagged with the sender's connection index.

mod connection;
mod local;
mod message;

pub use connection::{Connection, Incoming};
pub use local::{LocalConnection, LocalNetwork};
pub use message::{MessageId, SessionMessage};
