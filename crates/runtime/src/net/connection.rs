use crate::api::SessionError;

/// A message payload received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub from: u8,
    pub payload: Vec<u8>,
}

/// Byte-level link to the other peers of a match.
///
/// Polled once per simulation step; implementations must not block.
pub trait Connection: Send {
    /// Sends to one peer by connection index.
    fn send(&mut self, to: u8, payload: &[u8]) -> Result<(), SessionError>;

    /// Sends to every peer except this one.
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), SessionError>;

    fn is_connected(&self) -> bool;

    /// This endpoint's index; the host is always 0.
    fn connection_index(&self) -> Option<u8>;

    /// Drains every payload received since the last poll.
    fn poll(&mut self) -> Vec<Incoming>;
}
