use crate::ai::{self, Decision, UtilityContext};
use crate::combat::apply_damage;
use crate::command::Command;
use crate::config::GameConfig;
use crate::state::{ActionState, Character, CharacterId, Controller, StatusEffectKind, TagSet};

use super::{BattleEvent, GameEngine, TurnError};

/// Turn scheduling methods for GameEngine.
impl GameEngine<'_> {
    /// CT a character gains per tick: the charging ability's speed while one
    /// is pending, otherwise the character's own speed.
    pub fn charge_rate(&self, character: &Character) -> i32 {
        character
            .pending_ability
            .and_then(|pending| self.content.ability(pending.ability))
            .map_or_else(|| character.speed(), |ability| ability.speed)
    }

    /// The character with the greatest CT at or above the threshold. The
    /// lowest index wins ties.
    pub fn ready_character(&self) -> Option<CharacterId> {
        let mut best: Option<&Character> = None;
        for character in self.state.characters() {
            if character.ct < GameConfig::CT_THRESHOLD {
                continue;
            }
            if best.is_none_or(|b| character.ct > b.ct) {
                best = Some(character);
            }
        }
        best.map(|c| c.id)
    }

    /// Adds one tick of CT to every character, dead ones included.
    pub fn tick(&mut self) -> Result<(), TurnError> {
        if self.state.characters().is_empty() {
            return Err(TurnError::NoCharacters);
        }
        let rates: Vec<i32> = self
            .state
            .characters()
            .iter()
            .map(|character| self.charge_rate(character))
            .collect();
        if rates.iter().all(|&rate| rate <= 0) {
            return Err(TurnError::Stalled);
        }
        for (character, rate) in self.state.characters_mut().iter_mut().zip(rates) {
            character.ct += rate;
        }
        self.state.turn.ticks += 1;
        Ok(())
    }

    /// Ticks until someone is ready, then starts that character's turn.
    pub fn next_turn(&mut self) -> Result<CharacterId, TurnError> {
        let id = loop {
            if let Some(id) = self.ready_character() {
                break id;
            }
            self.tick()?;
        };
        self.begin_turn(id);
        Ok(id)
    }

    fn begin_turn(&mut self, id: CharacterId) {
        let Some(character) = self.state.character(id) else {
            return;
        };
        let (dead, pending, autonomous) = (
            character.dead,
            character.pending_ability.is_some(),
            character.controller == Controller::Ai || character.is_mind_controlled(),
        );
        self.state.turn.active = Some(id);
        tracing::debug!(character = %id, ticks = self.state.turn.ticks, "turn started");
        self.emit(BattleEvent::TurnStarted { character: id });

        if dead {
            self.decay(id);
            return;
        }
        if self.apply_poison(id) {
            self.end_turn(id, 0);
            return;
        }
        if pending {
            self.start_ability(id);
        } else if autonomous {
            self.run_ai(id);
        } else if let Some(character) = self.state.character(id) {
            let owner = character.owner;
            self.state.turn.awaiting_input = true;
            self.emit(BattleEvent::AwaitingInput {
                character: id,
                owner,
            });
        }
    }

    /// A dead character loses one HP per turn and leaves the map once it
    /// reaches the decay threshold.
    fn decay(&mut self, id: CharacterId) {
        let Some(character) = self.state.character_mut(id) else {
            return;
        };
        character.hp -= 1;
        character.ct = 0;
        let hp = character.hp;
        self.state.turn.active = None;
        self.emit(BattleEvent::Decayed { character: id, hp });

        if hp <= GameConfig::DECAY_THRESHOLD_HP && self.state.remove_character(id).is_some() {
            tracing::info!(character = %id, "character removed");
            self.emit(BattleEvent::CharacterRemoved { character: id });
        }
    }

    /// Returns true if the poison killed the character.
    fn apply_poison(&mut self, id: CharacterId) -> bool {
        let Some(character) = self.state.character_mut(id) else {
            return false;
        };
        if !character.has_status(StatusEffectKind::Poison) {
            return false;
        }
        let amount = (character.max_hp() as f32 * GameConfig::POISON_FRACTION).floor() as i32;
        let outcome = apply_damage(character, amount, &TagSet::new(), false);
        let hp = character.hp;
        self.emit(BattleEvent::Damaged {
            character: id,
            amount: outcome.dealt,
            hp,
            killed: outcome.killed,
        });
        outcome.killed
    }

    /// Starts the pending ability's transition. CT drops to zero now; the
    /// turn ends when the animation finishes.
    pub(super) fn start_ability(&mut self, id: CharacterId) {
        let Some(character) = self.state.character_mut(id) else {
            return;
        };
        let Some(pending) = character.pending_ability else {
            return;
        };
        character.ct = 0;
        character.action = ActionState::UsingAbility {
            elapsed: 0.0,
            hit_applied: false,
            effect_played: false,
        };
        tracing::debug!(character = %id, ability = ?pending.ability, "ability started");
        self.emit(BattleEvent::AbilityStarted {
            character: id,
            ability: pending.ability,
        });
    }

    fn run_ai(&mut self, id: CharacterId) {
        let mut rng = self.state.rng;
        let behavior = {
            let mut ctx = UtilityContext {
                state: &*self.state,
                content: self.content,
                config: self.config,
                rng: &mut rng,
            };
            ai::choose_behavior(&mut ctx, id)
        }
        .and_then(|index| self.state.character(id)?.behaviors.get(index).cloned());

        let decision = match behavior {
            Some(behavior) => ai::act(self.state, self.content, self.config, &mut rng, id, &behavior),
            None => Decision::Command(Command::Wait { actor: id }),
        };
        self.state.rng = rng;

        match decision {
            Decision::Command(command) => {
                let result = self.check(&command).and_then(|()| self.execute(command));
                match result {
                    Ok(()) => self.emit(BattleEvent::CommandDispatched(command)),
                    Err(error) => {
                        tracing::warn!(character = %id, %command, %error, "AI command rejected");
                        self.end_turn(id, 0);
                    }
                }
            }
            Decision::Pass => self.end_turn(id, 0),
        }
    }

    /// Ends `id`'s turn with `residual_ct` and counts down its status effects.
    pub fn end_turn(&mut self, id: CharacterId, residual_ct: i32) {
        self.state.turn.active = None;
        self.state.turn.awaiting_input = false;
        let Some(character) = self.state.character_mut(id) else {
            return;
        };
        character.ct = residual_ct;
        let expired = character.status.decrement();
        for kind in expired {
            self.emit(BattleEvent::StatusExpired {
                character: id,
                kind,
            });
        }
        tracing::debug!(character = %id, residual_ct, "turn ended");
        self.emit(BattleEvent::TurnEnded {
            character: id,
            residual_ct,
        });
    }
}
