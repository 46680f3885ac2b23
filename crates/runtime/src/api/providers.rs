//! Asynchronous abstraction for sourcing local player commands.
//!
//! AI characters never go through a provider: the engine decides for them
//! so every peer derives the same choice. Providers only answer for
//! characters owned by the local player.
use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use game_core::{BattleState, CharacterId, Command};

use super::errors::{Result, RuntimeError};

/// Source of commands for locally owned characters.
///
/// Implementations can wrap UI input, scripted fixtures or test doubles.
/// The returned command is validated before it is queued; a rejected
/// command makes the runtime ask again on a later step.
#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn provide_command(&self, character: CharacterId, state: &BattleState)
    -> Result<Command>;
}

/// Always waits. Useful for tests or as a fallback.
pub struct WaitInputProvider;

#[async_trait]
impl InputProvider for WaitInputProvider {
    async fn provide_command(
        &self,
        character: CharacterId,
        _state: &BattleState,
    ) -> Result<Command> {
        Ok(Command::Wait { actor: character })
    }
}

/// Forwards commands pushed through a [`CommandSender`], e.g. from a UI task.
pub struct ChannelInputProvider {
    rx: Mutex<mpsc::Receiver<Command>>,
}

/// Sending half of a [`ChannelInputProvider`].
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<Command>,
}

impl ChannelInputProvider {
    pub fn new(buffer: usize) -> (Self, CommandSender) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self { rx: Mutex::new(rx) },
            CommandSender { tx },
        )
    }
}

impl CommandSender {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::InputChannelClosed)
    }
}

#[async_trait]
impl InputProvider for ChannelInputProvider {
    async fn provide_command(
        &self,
        character: CharacterId,
        _state: &BattleState,
    ) -> Result<Command> {
        let mut rx = self.rx.lock().await;
        let command = rx.recv().await.ok_or(RuntimeError::InputChannelClosed)?;
        if command.actor() != character {
            tracing::debug!(%character, %command, "input for a different character");
        }
        Ok(command)
    }
}
