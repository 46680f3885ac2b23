//! Command validation and execution.

use crate::command::Command;
use crate::config::GameConfig;
use crate::pathfinding::{Mover, generate_path, reachable_tiles};
use crate::state::{AbilityTarget, ActionState, Character, CharacterId, PendingAbility, Position};

use super::{BattleEvent, CommandError, GameEngine};

impl GameEngine<'_> {
    /// Checks that `command` could be dispatched right now.
    ///
    /// The runtime calls this for local input before queueing it, so a
    /// queued command that later fails is a protocol violation.
    pub fn validate(&self, command: &Command) -> Result<(), CommandError> {
        if !self.state.turn.awaiting_input {
            return Err(CommandError::NotAwaitingInput);
        }
        self.check(command)
    }

    /// Validates and executes a command for the character awaiting input.
    pub fn dispatch(&mut self, command: Command) -> Result<(), CommandError> {
        self.validate(&command)?;
        self.state.turn.awaiting_input = false;
        self.execute(command)?;
        tracing::debug!(%command, "command dispatched");
        self.emit(BattleEvent::CommandDispatched(command));
        Ok(())
    }

    /// Rules shared by player input and AI decisions.
    pub(super) fn check(&self, command: &Command) -> Result<(), CommandError> {
        let actor = self.actor(command.actor())?;
        if self.is_busy() {
            return Err(CommandError::Busy);
        }

        match *command {
            Command::Attack { target, .. } => {
                let victim = self
                    .state
                    .character(target)
                    .ok_or(CommandError::UnknownCharacter(target))?;
                if victim.id == actor.id || victim.dead {
                    return Err(CommandError::InvalidTarget(target));
                }
                let tile = victim.tile.ok_or(CommandError::InvalidTarget(target))?;
                self.require_in_range(actor, tile, actor.attack_range, actor.max_attack_height_difference)
            }
            Command::Move { destination, .. } => {
                if reachable_tiles(&self.state.grid, actor, None).contains(&destination) {
                    Ok(())
                } else {
                    Err(CommandError::NotReachable(destination))
                }
            }
            Command::UseAbility { slot, target, .. } => {
                let id = actor.ability_at(slot).ok_or(CommandError::NoAbility { slot })?;
                let ability = self
                    .content
                    .ability(id)
                    .ok_or(CommandError::UnknownAbility(id))?;
                let tile = self.target_tile(target)?;
                self.require_in_range(actor, tile, ability.range, ability.max_height_difference)
            }
            Command::Wait { .. } => Ok(()),
        }
    }

    fn actor(&self, id: CharacterId) -> Result<&Character, CommandError> {
        let actor = self
            .state
            .character(id)
            .ok_or(CommandError::UnknownCharacter(id))?;
        if self.state.turn.active != Some(id) {
            return Err(CommandError::NotActive {
                actor: id,
                active: self.state.turn.active,
            });
        }
        if actor.dead {
            return Err(CommandError::Dead(id));
        }
        Ok(actor)
    }

    fn target_tile(&self, target: AbilityTarget) -> Result<Position, CommandError> {
        match target {
            AbilityTarget::Tile(tile) => Ok(tile),
            AbilityTarget::Character(id) => self
                .state
                .character(id)
                .and_then(|c| c.tile)
                .ok_or(CommandError::UnknownCharacter(id)),
        }
    }

    fn require_in_range(
        &self,
        actor: &Character,
        tile: Position,
        range: i32,
        max_height_difference: f32,
    ) -> Result<(), CommandError> {
        let origin = actor.tile.ok_or(CommandError::OutOfRange(tile))?;
        if self
            .state
            .grid
            .targetable_tiles(origin, range, max_height_difference)
            .contains(&tile)
        {
            Ok(())
        } else {
            Err(CommandError::OutOfRange(tile))
        }
    }

    /// Applies a checked command.
    pub(super) fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Attack { actor, target } => {
                let character = self
                    .state
                    .character_mut(actor)
                    .ok_or(CommandError::UnknownCharacter(actor))?;
                character.targeted = Some(target);
                character.action = ActionState::Attacking {
                    target,
                    elapsed: 0.0,
                    hit_applied: false,
                };
            }
            Command::Move { actor, destination } => {
                let character = self
                    .state
                    .character(actor)
                    .ok_or(CommandError::UnknownCharacter(actor))?;
                let origin = character.tile.ok_or(CommandError::NoPath(destination))?;
                let mover = Mover::of(character);
                let path = generate_path(&mut self.state.grid, &mover, origin, destination);
                if path.is_empty() {
                    return Err(CommandError::NoPath(destination));
                }
                if let Some(character) = self.state.character_mut(actor) {
                    character.action = ActionState::Moving {
                        path,
                        progress: 0.0,
                    };
                }
            }
            Command::UseAbility {
                actor,
                slot,
                target,
            } => {
                let character = self
                    .state
                    .character_mut(actor)
                    .ok_or(CommandError::UnknownCharacter(actor))?;
                let id = character
                    .ability_at(slot)
                    .ok_or(CommandError::NoAbility { slot })?;
                let ability = self
                    .content
                    .ability(id)
                    .ok_or(CommandError::UnknownAbility(id))?;
                character.pending_ability = Some(PendingAbility {
                    ability: id,
                    target,
                });
                if let AbilityTarget::Character(victim) = target {
                    character.targeted = Some(victim);
                }
                if ability.is_instant() {
                    self.start_ability(actor);
                } else {
                    self.end_turn(actor, 0);
                }
            }
            Command::Wait { actor } => self.end_turn(actor, GameConfig::WAIT_RESIDUAL_CT),
        }
        Ok(())
    }
}
