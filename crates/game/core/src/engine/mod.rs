//! Turn scheduling, command dispatch and timed action transitions.
//!
//! The [`GameEngine`] is the authoritative reducer for [`BattleState`]. One
//! call to [`GameEngine::advance`] is one fixed simulation step:
//!
//! 1. advance every running transition by the clamped frame delta,
//! 2. if nothing is busy and a character is waiting for input, dispatch the
//!    front of the command queue,
//! 3. otherwise, if no turn is in progress, tick CT and start the next turn.
//!
//! AI characters decide inside step 3 and dispatch directly; their commands
//! never enter the queue, so every peer and every replay re-derives them
//! from the shared RNG.

mod dispatch;
mod errors;
mod events;
mod transitions;
mod turns;

pub use errors::{CommandError, EngineError, ProtocolError, TurnError};
pub use events::BattleEvent;

use crate::command::CommandQueue;
use crate::config::GameConfig;
use crate::env::ContentRegistry;
use crate::state::BattleState;

/// Drives one battle. Cheap to construct; the runtime builds one per step.
pub struct GameEngine<'a> {
    state: &'a mut BattleState,
    content: &'a ContentRegistry,
    config: &'a GameConfig,
    events: Vec<BattleEvent>,
}

impl<'a> GameEngine<'a> {
    pub fn new(
        state: &'a mut BattleState,
        content: &'a ContentRegistry,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            state,
            content,
            config,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    /// Runs one simulation step and returns the events it produced.
    ///
    /// A queued command that fails validation is reported as a
    /// [`ProtocolError`]; the queue has already dropped it.
    pub fn advance(
        &mut self,
        queue: &mut CommandQueue,
        delta_seconds: f32,
    ) -> Result<Vec<BattleEvent>, EngineError> {
        let delta_seconds = self.config.clamp_delta(delta_seconds);
        self.update(delta_seconds);

        if !self.is_busy() {
            if self.state.turn.awaiting_input {
                if let Some(command) = queue.pop_ready(self.state) {
                    self.dispatch(command)
                        .map_err(|source| ProtocolError::Rejected { command, source })?;
                    queue.record(command);
                }
            } else if self.state.turn.active.is_none() {
                self.next_turn()?;
            }
        }

        Ok(self.take_events())
    }

    /// True while any character is still playing out an action.
    pub fn is_busy(&self) -> bool {
        self.state
            .characters()
            .iter()
            .any(|character| !character.action.is_idle())
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests;
