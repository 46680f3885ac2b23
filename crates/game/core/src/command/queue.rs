//! Pending and history FIFOs.

use std::collections::VecDeque;

use super::Command;
use crate::config::GameConfig;
use crate::state::BattleState;

/// How the pending queue releases commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueMode {
    /// Commands are released in arrival order.
    #[default]
    Live,
    /// The front command is held until its actor's CT has charged again, so
    /// the scheduler is re-derived in lockstep with the recorded match.
    Replay,
}

/// Commands waiting for dispatch, and every command dispatched so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandQueue {
    mode: QueueMode,
    pending: VecDeque<Command>,
    history: Vec<Command>,
}

impl CommandQueue {
    pub fn new(mode: QueueMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Queue pre-loaded with a recorded command stream.
    pub fn replay(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            mode: QueueMode::Replay,
            pending: commands.into_iter().collect(),
            history: Vec::new(),
        }
    }

    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn front(&self) -> Option<&Command> {
        self.pending.front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes the front command if the mode allows it to run now.
    ///
    /// In replay mode a front command whose actor no longer exists is
    /// released anyway so dispatch can reject it.
    pub fn pop_ready(&mut self, state: &BattleState) -> Option<Command> {
        let front = self.pending.front()?;
        if self.mode == QueueMode::Replay {
            let charged = state
                .character(front.actor())
                .is_none_or(|c| c.ct >= GameConfig::CT_THRESHOLD);
            if !charged {
                return None;
            }
        }
        self.pending.pop_front()
    }

    /// Appends a dispatched command to the history.
    pub fn record(&mut self, command: Command) {
        self.history.push(command);
    }

    pub fn history(&self) -> &[Command] {
        &self.history
    }

    pub fn take_history(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.history)
    }
}
