//! Session message codec.
//!
//! Every payload starts with a `u8` message id. Fixed-width fields use the
//! same little-endian fixint layout as the command codec.

use serde::{Deserialize, Serialize};

use game_core::{CharacterId, Command, WireCommand};

use crate::api::SessionError;

/// Wire ids of the session messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    JoinResponse = 17,
    JoinRequest = 18,
    TurnAlert = 19,
    Command = 20,
}

impl TryFrom<u8> for MessageId {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            17 => MessageId::JoinResponse,
            18 => MessageId::JoinRequest,
            19 => MessageId::TurnAlert,
            20 => MessageId::Command,
            other => return Err(SessionError::UnknownMessage(other)),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct JoinHeader {
    max_players: u8,
    current_players: u8,
    seed: u32,
}

impl JoinHeader {
    const ENCODED_LEN: usize = 1 + 1 + 4;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    /// Host to joining peer: capacity, the match seed and every connection
    /// index already in the match (the joiner's included).
    JoinResponse {
        max_players: u8,
        seed: u32,
        players: Vec<u8>,
    },
    JoinRequest,
    /// Host to the owner of the character whose turn just started.
    TurnAlert { character: CharacterId },
    Command(Command),
}

impl SessionMessage {
    pub fn id(&self) -> MessageId {
        match self {
            SessionMessage::JoinResponse { .. } => MessageId::JoinResponse,
            SessionMessage::JoinRequest => MessageId::JoinRequest,
            SessionMessage::TurnAlert { .. } => MessageId::TurnAlert,
            SessionMessage::Command(_) => MessageId::Command,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SessionError> {
        let mut bytes = vec![self.id() as u8];
        match self {
            SessionMessage::JoinResponse {
                max_players,
                seed,
                players,
            } => {
                let header = JoinHeader {
                    max_players: *max_players,
                    current_players: u8::try_from(players.len()).map_err(|_| {
                        SessionError::Full {
                            max: *max_players,
                        }
                    })?,
                    seed: *seed,
                };
                let encoded = bincode::serialize(&header)
                    .map_err(|e| game_core::CodecError::Serialization(e.to_string()))?;
                bytes.extend_from_slice(&encoded);
                bytes.extend_from_slice(players);
            }
            SessionMessage::JoinRequest => {}
            SessionMessage::TurnAlert { character } => bytes.push(character.0),
            SessionMessage::Command(command) => bytes.extend_from_slice(&command.encode()?),
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SessionError> {
        let (&first, body) = bytes.split_first().ok_or(SessionError::EmptyMessage)?;
        let id = MessageId::try_from(first)?;
        let expect = |expected: usize| {
            if body.len() == expected {
                Ok(())
            } else {
                Err(SessionError::Truncated {
                    id: first,
                    expected,
                    actual: body.len(),
                })
            }
        };

        match id {
            MessageId::JoinResponse => {
                if body.len() < JoinHeader::ENCODED_LEN {
                    return Err(SessionError::Truncated {
                        id: first,
                        expected: JoinHeader::ENCODED_LEN,
                        actual: body.len(),
                    });
                }
                let (head, players) = body.split_at(JoinHeader::ENCODED_LEN);
                let header: JoinHeader = bincode::deserialize(head)
                    .map_err(|e| game_core::CodecError::Serialization(e.to_string()))?;
                expect(JoinHeader::ENCODED_LEN + usize::from(header.current_players))?;
                Ok(SessionMessage::JoinResponse {
                    max_players: header.max_players,
                    seed: header.seed,
                    players: players.to_vec(),
                })
            }
            MessageId::JoinRequest => {
                expect(0)?;
                Ok(SessionMessage::JoinRequest)
            }
            MessageId::TurnAlert => {
                expect(1)?;
                Ok(SessionMessage::TurnAlert {
                    character: CharacterId(body[0]),
                })
            }
            MessageId::Command => {
                expect(WireCommand::ENCODED_LEN)?;
                Ok(SessionMessage::Command(Command::decode(body)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::Position;

    use super::*;

    #[test]
    fn join_response_layout() {
        let message = SessionMessage::JoinResponse {
            max_players: 2,
            seed: 0x0102_0304,
            players: vec![0, 1],
        };
        let bytes = message.encode().unwrap();
        assert_eq!(bytes, vec![17, 2, 2, 0x04, 0x03, 0x02, 0x01, 0, 1]);
        assert_eq!(SessionMessage::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn command_is_id_plus_wire_record() {
        let command = Command::Move {
            actor: CharacterId(3),
            destination: Position::new(2, 5),
        };
        let bytes = SessionMessage::Command(command).encode().unwrap();
        assert_eq!(bytes.len(), 1 + WireCommand::ENCODED_LEN);
        assert_eq!(bytes[0], 20);
        assert_eq!(&bytes[1..], command.encode().unwrap().as_slice());
    }

    #[test]
    fn short_and_unknown_messages_are_rejected() {
        assert!(matches!(
            SessionMessage::decode(&[]),
            Err(SessionError::EmptyMessage)
        ));
        assert!(matches!(
            SessionMessage::decode(&[42]),
            Err(SessionError::UnknownMessage(42))
        ));
        assert!(matches!(
            SessionMessage::decode(&[17, 2, 3, 0, 0, 0, 0, 0]),
            Err(SessionError::Truncated { id: 17, .. })
        ));
        assert!(matches!(
            SessionMessage::decode(&[19]),
            Err(SessionError::Truncated { id: 19, .. })
        ));
        assert_eq!(
            SessionMessage::decode(&[18]).unwrap(),
            SessionMessage::JoinRequest
        );
    }
}
