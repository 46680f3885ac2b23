//! Match session state machine.
//!
//! The session owns the connection and translates wire messages into
//! [`SessionSignal`]s for the driver. It never touches battle state: remote
//! commands come out as plain [`Command`] values that the driver queues like
//! local ones.

use serde::{Deserialize, Serialize};

use game_core::{CharacterId, Command, PlayerId};

use crate::api::SessionError;
use crate::events::SessionEvent;
use crate::net::{Connection, Incoming, SessionMessage};

/// Steps of joining a hosted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinState {
    /// Waiting for an address; a failed attempt lands here again.
    Setup,
    /// Connected; the join request goes out once the link is up.
    Connecting,
    /// Join request sent, waiting for the host's response.
    AwaitingInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Menu,
    Hosting,
    Joining(JoinState),
    Playing,
    /// The match is over; the result screen is up until the player returns
    /// to the menu.
    Ended,
}

/// What the driver has to act on after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// Everybody is in; build the battle from this seed.
    MatchReady { seed: u32 },
    Command(Command),
    TurnAlert(CharacterId),
    /// The match link is gone; the session is back in the menu.
    Disconnected,
}

pub struct Session {
    state: SessionState,
    connection: Option<Box<dyn Connection>>,
    /// Joined connection indices, by slot.
    players: Vec<Option<u8>>,
    max_players: u8,
    seed: u32,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(max_players: u8) -> Self {
        Self {
            state: SessionState::Menu,
            connection: None,
            players: vec![None; usize::from(max_players)],
            max_players,
            seed: 0,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn max_players(&self) -> u8 {
        self.max_players
    }

    pub fn player_count(&self) -> usize {
        self.players.iter().flatten().count()
    }

    /// The local player's id: its connection index.
    pub fn local_player(&self) -> PlayerId {
        PlayerId(
            self.connection
                .as_ref()
                .and_then(|c| c.connection_index())
                .unwrap_or(0),
        )
    }

    pub fn is_host(&self) -> bool {
        self.local_player() == PlayerId(0)
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts hosting a match with `seed` on an already listening connection.
    pub fn host(&mut self, connection: Box<dyn Connection>, seed: u32) {
        self.reset();
        let index = connection.connection_index().unwrap_or(0);
        self.connection = Some(connection);
        self.seed = seed;
        self.add_player(index);
        tracing::info!(seed, max_players = self.max_players, "hosting match");
        self.set_state(SessionState::Hosting);
    }

    /// Opens the join screen.
    pub fn begin_join(&mut self) {
        self.reset();
        self.set_state(SessionState::Joining(JoinState::Setup));
    }

    /// Hands over the result of connecting to a host.
    ///
    /// On failure the session stays in join setup and posts "Join failed.".
    pub fn join(
        &mut self,
        connection: Result<Box<dyn Connection>, SessionError>,
    ) -> Result<(), SessionError> {
        match connection {
            Ok(connection) => {
                self.connection = Some(connection);
                self.set_state(SessionState::Joining(JoinState::Connecting));
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "join failed");
                self.events
                    .push(SessionEvent::Notice(SessionError::JoinFailed.to_string()));
                self.set_state(SessionState::Joining(JoinState::Setup));
                Err(SessionError::JoinFailed)
            }
        }
    }

    /// Closes the connection and returns to the menu.
    pub fn leave(&mut self) {
        self.reset();
        self.set_state(SessionState::Menu);
    }

    /// Ends the match after a rule violation by a peer.
    pub fn drop_peer(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "dropping peer");
        self.events.push(SessionEvent::PeerDropped { reason });
        self.leave();
    }

    /// Marks the match as over. The connection stays open until [`leave`],
    /// so a peer finishing a step later still sees its own result.
    ///
    /// [`leave`]: Session::leave
    pub fn finish(&mut self) {
        self.set_state(SessionState::Ended);
    }

    /// Broadcasts a locally issued command to the other peers.
    pub fn send_command(&mut self, command: Command) -> Result<(), SessionError> {
        let payload = SessionMessage::Command(command).encode()?;
        self.connection_mut()?.broadcast(&payload)
    }

    /// Tells a remote owner that one of its characters is up. Only the host
    /// sends alerts, and never to itself.
    pub fn send_turn_alert(
        &mut self,
        owner: PlayerId,
        character: CharacterId,
    ) -> Result<(), SessionError> {
        if !self.is_host() || owner == self.local_player() || !self.has_player(owner.0) {
            return Ok(());
        }
        let payload = SessionMessage::TurnAlert { character }.encode()?;
        self.connection_mut()?.send(owner.0, &payload)
    }

    /// Polls the connection, handles every message and advances the state
    /// machine by one step.
    pub fn update(&mut self) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        let Some(connection) = self.connection.as_mut() else {
            return signals;
        };

        if self.state == SessionState::Playing && !connection.is_connected() {
            self.drop_peer("connection lost");
            signals.push(SessionSignal::Disconnected);
            return signals;
        }

        for Incoming { from, payload } in connection.poll() {
            let handled = SessionMessage::decode(&payload)
                .and_then(|message| self.handle(from, message, &mut signals));
            if let Err(error) = handled {
                self.drop_peer(format!("connection {from}: {error}"));
                signals.push(SessionSignal::Disconnected);
                return signals;
            }
        }

        self.advance(&mut signals);
        signals
    }

    fn handle(
        &mut self,
        from: u8,
        message: SessionMessage,
        signals: &mut Vec<SessionSignal>,
    ) -> Result<(), SessionError> {
        tracing::trace!(from, id = ?message.id(), "session message");
        match message {
            SessionMessage::JoinRequest => {
                if self.state != SessionState::Hosting {
                    return Ok(());
                }
                if self.player_count() >= usize::from(self.max_players) {
                    tracing::warn!(from, "{}", SessionError::Full { max: self.max_players });
                    return Ok(());
                }
                self.add_player(from);
                self.events.push(SessionEvent::PlayerJoined { connection: from });
                let response = SessionMessage::JoinResponse {
                    max_players: self.max_players,
                    seed: self.seed,
                    players: self.players.iter().flatten().copied().collect(),
                };
                let payload = response.encode()?;
                self.connection_mut()?.send(from, &payload)?;
            }
            SessionMessage::JoinResponse {
                max_players,
                seed,
                players,
            } => {
                if self.state != SessionState::Joining(JoinState::AwaitingInfo) {
                    return Ok(());
                }
                self.max_players = max_players;
                self.players = vec![None; usize::from(max_players)];
                self.seed = seed;
                for index in players {
                    self.add_player(index);
                }
            }
            SessionMessage::TurnAlert { character } => {
                self.events.push(SessionEvent::TurnAlert { character });
                signals.push(SessionSignal::TurnAlert(character));
            }
            SessionMessage::Command(command) => {
                if self.state == SessionState::Playing {
                    signals.push(SessionSignal::Command(command));
                } else {
                    tracing::debug!(%command, state = ?self.state, "command outside a match");
                }
            }
        }
        Ok(())
    }

    fn advance(&mut self, signals: &mut Vec<SessionSignal>) {
        let connected = self.connection.as_ref().is_some_and(|c| c.is_connected());
        let state = self.state;
        match state {
            SessionState::Hosting if self.player_count() > 1 => {
                self.start_match(signals);
            }
            SessionState::Joining(JoinState::Connecting) if connected => {
                let sent = SessionMessage::JoinRequest
                    .encode()
                    .and_then(|payload| self.connection_mut()?.send(0, &payload));
                match sent {
                    Ok(()) => self.set_state(SessionState::Joining(JoinState::AwaitingInfo)),
                    Err(error) => {
                        self.connection = None;
                        let _ = self.join(Err(error));
                    }
                }
            }
            SessionState::Joining(JoinState::AwaitingInfo) => {
                if self.has_player(self.local_player().0) {
                    self.start_match(signals);
                } else if !connected {
                    self.connection = None;
                    self.set_state(SessionState::Joining(JoinState::Setup));
                }
            }
            _ => {}
        }
    }

    fn start_match(&mut self, signals: &mut Vec<SessionSignal>) {
        tracing::info!(seed = self.seed, players = self.player_count(), "match starting");
        self.set_state(SessionState::Playing);
        signals.push(SessionSignal::MatchReady { seed: self.seed });
    }

    fn add_player(&mut self, index: u8) {
        if let Some(slot) = self.players.get_mut(usize::from(index)) {
            *slot = Some(index);
        }
    }

    fn has_player(&self, index: u8) -> bool {
        self.players
            .get(usize::from(index))
            .is_some_and(Option::is_some)
    }

    fn connection_mut(&mut self) -> Result<&mut Box<dyn Connection>, SessionError> {
        self.connection.as_mut().ok_or(SessionError::NotConnected)
    }

    fn reset(&mut self) {
        self.connection = None;
        self.players = vec![None; usize::from(self.max_players)];
    }

    fn set_state(&mut self, to: SessionState) {
        if self.state != to {
            tracing::debug!(from = ?self.state, ?to, "session state");
            self.events.push(SessionEvent::StateChanged {
                from: self.state,
                to,
            });
            self.state = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::Position;

    use super::*;
    use crate::net::LocalNetwork;

    fn joined_pair() -> (LocalNetwork, Session, Session) {
        let network = LocalNetwork::new(2);
        let mut host = Session::new(2);
        host.host(Box::new(network.host().unwrap()), 77);

        let mut client = Session::new(2);
        client.begin_join();
        client
            .join(network.connect().map(|c| Box::new(c) as Box<dyn Connection>))
            .unwrap();
        (network, host, client)
    }

    #[test]
    fn handshake_shares_the_seed() {
        let (_network, mut host, mut client) = joined_pair();

        assert!(client.update().is_empty());
        assert_eq!(client.state(), SessionState::Joining(JoinState::AwaitingInfo));

        assert_eq!(host.update(), vec![SessionSignal::MatchReady { seed: 77 }]);
        assert_eq!(host.state(), SessionState::Playing);

        assert_eq!(client.update(), vec![SessionSignal::MatchReady { seed: 77 }]);
        assert_eq!(client.state(), SessionState::Playing);
        assert_eq!(client.local_player(), PlayerId(1));
        assert_eq!(client.player_count(), 2);
    }

    #[test]
    fn failed_join_posts_a_notice_and_stays_in_setup() {
        let network = LocalNetwork::new(2);
        let mut session = Session::new(2);
        session.begin_join();
        session.take_events();

        let result = session.join(network.connect().map(|c| Box::new(c) as Box<dyn Connection>));
        assert!(matches!(result, Err(SessionError::JoinFailed)));
        assert_eq!(session.state(), SessionState::Joining(JoinState::Setup));
        assert_eq!(
            session.take_events(),
            vec![SessionEvent::Notice("Join failed.".into())]
        );
    }

    #[test]
    fn commands_and_alerts_reach_the_other_peer() {
        let (_network, mut host, mut client) = joined_pair();
        client.update();
        host.update();
        client.update();

        let command = Command::Move {
            actor: CharacterId(2),
            destination: Position::new(1, 1),
        };
        client.send_command(command).unwrap();
        host.send_turn_alert(PlayerId(1), CharacterId(2)).unwrap();
        host.send_turn_alert(PlayerId(0), CharacterId(1)).unwrap();

        assert_eq!(host.update(), vec![SessionSignal::Command(command)]);
        assert_eq!(
            client.update(),
            vec![SessionSignal::TurnAlert(CharacterId(2))]
        );
    }

    #[test]
    fn losing_the_host_returns_to_menu() {
        let (_network, mut host, mut client) = joined_pair();
        client.update();
        host.update();
        client.update();

        host.leave();
        assert_eq!(client.update(), vec![SessionSignal::Disconnected]);
        assert_eq!(client.state(), SessionState::Menu);
    }

    #[test]
    fn malformed_messages_drop_the_peer() {
        let network = LocalNetwork::new(2);
        let mut host = Session::new(2);
        host.host(Box::new(network.host().unwrap()), 1);
        let mut raw = network.connect().unwrap();
        raw.send(0, &[99]).unwrap();

        assert_eq!(host.update(), vec![SessionSignal::Disconnected]);
        assert_eq!(host.state(), SessionState::Menu);
        assert!(
            host.take_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::PeerDropped { .. }))
        );
    }
}
