//! In-process transport over tokio channels.
//!
//! Used by tests and by the headless client to run both peers of a match
//! in one process.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::{Connection, Incoming};
use crate::api::SessionError;

#[derive(Default)]
struct Hub {
    slots: Vec<Option<mpsc::UnboundedSender<Incoming>>>,
    /// A joined endpoint went away.
    lost_peer: bool,
}

/// Shared switchboard handing out [`LocalConnection`] endpoints.
#[derive(Clone)]
pub struct LocalNetwork {
    hub: Arc<Mutex<Hub>>,
}

impl LocalNetwork {
    pub fn new(max_players: u8) -> Self {
        let hub = Hub {
            slots: vec![None; usize::from(max_players)],
            lost_peer: false,
        };
        Self {
            hub: Arc::new(Mutex::new(hub)),
        }
    }

    /// Opens the host endpoint (index 0).
    pub fn host(&self) -> Result<LocalConnection, SessionError> {
        self.open(|index| index == 0)
    }

    /// Connects a client to the host; fails when nobody is hosting or every
    /// slot is taken.
    pub fn connect(&self) -> Result<LocalConnection, SessionError> {
        {
            let hub = self.hub.lock().map_err(|_| SessionError::JoinFailed)?;
            if hub.slots.first().is_none_or(Option::is_none) {
                return Err(SessionError::JoinFailed);
            }
        }
        self.open(|index| index > 0)
    }

    fn open(&self, eligible: impl Fn(usize) -> bool) -> Result<LocalConnection, SessionError> {
        let mut hub = self.hub.lock().map_err(|_| SessionError::JoinFailed)?;
        let index = hub
            .slots
            .iter()
            .enumerate()
            .position(|(index, slot)| eligible(index) && slot.is_none())
            .ok_or(SessionError::JoinFailed)?;
        let (tx, rx) = mpsc::unbounded_channel();
        hub.slots[index] = Some(tx);
        if index == 0 {
            hub.lost_peer = false;
        }
        tracing::debug!(index, "local endpoint opened");
        Ok(LocalConnection {
            index: index as u8,
            hub: Arc::clone(&self.hub),
            rx,
        })
    }
}

/// One endpoint of a [`LocalNetwork`]. Dropping it disconnects.
pub struct LocalConnection {
    index: u8,
    hub: Arc<Mutex<Hub>>,
    rx: mpsc::UnboundedReceiver<Incoming>,
}

impl LocalConnection {
    fn deliver(&self, to: u8, payload: &[u8]) -> Result<(), SessionError> {
        let hub = self.hub.lock().map_err(|_| SessionError::NotConnected)?;
        let slot = hub
            .slots
            .get(usize::from(to))
            .and_then(Option::as_ref)
            .ok_or(SessionError::ConnectionClosed(to))?;
        slot.send(Incoming {
            from: self.index,
            payload: payload.to_vec(),
        })
        .map_err(|_| SessionError::ConnectionClosed(to))
    }
}

impl Connection for LocalConnection {
    fn send(&mut self, to: u8, payload: &[u8]) -> Result<(), SessionError> {
        self.deliver(to, payload)
    }

    fn broadcast(&mut self, payload: &[u8]) -> Result<(), SessionError> {
        let peers: Vec<u8> = {
            let hub = self.hub.lock().map_err(|_| SessionError::NotConnected)?;
            hub.slots
                .iter()
                .enumerate()
                .filter(|(index, slot)| *index != usize::from(self.index) && slot.is_some())
                .map(|(index, _)| index as u8)
                .collect()
        };
        for peer in peers {
            self.deliver(peer, payload)?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        let Ok(hub) = self.hub.lock() else {
            return false;
        };
        if self.index == 0 {
            !hub.lost_peer
        } else {
            hub.slots.first().is_some_and(Option::is_some)
        }
    }

    fn connection_index(&self) -> Option<u8> {
        Some(self.index)
    }

    fn poll(&mut self) -> Vec<Incoming> {
        let mut received = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            received.push(message);
        }
        received
    }
}

impl Drop for LocalConnection {
    fn drop(&mut self) {
        if let Ok(mut hub) = self.hub.lock() {
            if let Some(slot) = hub.slots.get_mut(usize::from(self.index)) {
                *slot = None;
            }
            if self.index != 0 {
                hub.lost_peer = true;
            }
        }
    }
}
