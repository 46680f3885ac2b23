//! Timed action transitions, advanced once per frame.
//!
//! Each character's [`ActionState`] is taken out, advanced by `dt`, and put
//! back; hits and turn ends fire when their timing thresholds are crossed.

use crate::combat::{ability_damage, apply_damage, attack_damage};
use crate::env::AnimType;
use crate::state::{AbilityTarget, ActionState, CharacterId, Position, TagSet};

use super::{BattleEvent, GameEngine};

impl GameEngine<'_> {
    /// Advances every running transition by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for id in self.state.character_ids() {
            let Some(character) = self.state.character_mut(id) else {
                continue;
            };
            character.status.advance_rendering(dt);
            let action = std::mem::take(&mut character.action);
            let next = match action {
                ActionState::Idle => ActionState::Idle,
                ActionState::Moving { path, progress } => self.update_move(id, path, progress, dt),
                ActionState::Attacking {
                    target,
                    elapsed,
                    hit_applied,
                } => self.update_attack(id, target, elapsed + dt, hit_applied),
                ActionState::UsingAbility {
                    elapsed,
                    hit_applied,
                    effect_played,
                } => self.update_ability(id, elapsed + dt, hit_applied, effect_played),
                ActionState::Hit { elapsed } => {
                    let elapsed = elapsed + dt;
                    let duration = self
                        .state
                        .character(id)
                        .map_or(0.0, |c| c.timings.hit_duration);
                    if elapsed >= duration {
                        ActionState::Idle
                    } else {
                        ActionState::Hit { elapsed }
                    }
                }
            };
            // A finished action leaves in place any hit reaction it caused
            // on its own actor.
            if !next.is_idle()
                && let Some(character) = self.state.character_mut(id)
            {
                character.action = next;
            }
        }
    }

    fn update_move(
        &mut self,
        id: CharacterId,
        mut path: Vec<Position>,
        mut progress: f32,
        dt: f32,
    ) -> ActionState {
        progress += dt * self.config.move_tiles_per_second;
        while progress >= 1.0 {
            let Some(next) = path.pop() else {
                break;
            };
            progress -= 1.0;
            if !self.state.move_character(id, next) {
                tracing::warn!(character = %id, tile = %next, "movement blocked");
                path.clear();
                break;
            }
            self.emit(BattleEvent::Moved {
                character: id,
                to: next,
            });
        }
        if path.is_empty() {
            self.end_turn(id, 0);
            ActionState::Idle
        } else {
            ActionState::Moving { path, progress }
        }
    }

    fn update_attack(
        &mut self,
        id: CharacterId,
        target: CharacterId,
        elapsed: f32,
        hit_applied: bool,
    ) -> ActionState {
        let Some(timings) = self.state.character(id).map(|c| c.timings) else {
            return ActionState::Idle;
        };
        let mut hit_applied = hit_applied;
        if !hit_applied && elapsed >= timings.melee_time_before_hit {
            hit_applied = true;
            let hit = self.state.character(id).zip(self.state.character(target)).map(
                |(attacker, victim)| (attack_damage(attacker, victim), attacker.attack_damage_tags()),
            );
            if let Some((amount, tags)) = hit {
                self.damage(target, amount, &tags);
            }
        }
        if elapsed >= timings.attack_duration {
            if let Some(character) = self.state.character_mut(id) {
                character.targeted = None;
            }
            self.end_turn(id, 0);
            return ActionState::Idle;
        }
        ActionState::Attacking {
            target,
            elapsed,
            hit_applied,
        }
    }

    fn update_ability(
        &mut self,
        id: CharacterId,
        elapsed: f32,
        hit_applied: bool,
        effect_played: bool,
    ) -> ActionState {
        let content = self.content;
        let Some(character) = self.state.character(id) else {
            return ActionState::Idle;
        };
        let timings = character.timings;
        let Some((pending, ability)) = character
            .pending_ability
            .and_then(|p| Some((p, content.ability(p.ability)?)))
        else {
            self.end_turn(id, 0);
            return ActionState::Idle;
        };

        let time_before_hit = match ability.anim {
            AnimType::Melee => timings.melee_time_before_hit,
            AnimType::Spell => timings.spell_time_before_hit,
            AnimType::Ranged => timings.ranged_time_before_hit,
        };
        let mut hit_applied = hit_applied;
        if !hit_applied && elapsed >= time_before_hit {
            hit_applied = true;
            self.resolve_ability(id, pending.target);
        }
        let mut effect_played = effect_played;
        if !effect_played && elapsed >= ability.effect_delay {
            effect_played = true;
            self.emit(BattleEvent::AbilityEffect {
                character: id,
                ability: pending.ability,
            });
        }
        if elapsed >= timings.ability_duration {
            if let Some(character) = self.state.character_mut(id) {
                character.pending_ability = None;
                character.targeted = None;
            }
            self.end_turn(id, 0);
            return ActionState::Idle;
        }
        ActionState::UsingAbility {
            elapsed,
            hit_applied,
            effect_played,
        }
    }

    /// Applies the caster's pending ability to every living character in
    /// its area. A character target is resolved to wherever it stands now.
    fn resolve_ability(&mut self, caster: CharacterId, target: AbilityTarget) {
        let content = self.content;
        let Some(ability) = self
            .state
            .character(caster)
            .and_then(|c| c.pending_ability)
            .and_then(|p| content.ability(p.ability))
        else {
            return;
        };
        let center = match target {
            AbilityTarget::Tile(tile) => Some(tile),
            AbilityTarget::Character(id) => self.state.character(id).and_then(|c| c.tile),
        };
        let Some(center) = center else {
            return;
        };

        for tile in self
            .state
            .grid
            .aoe_tiles(center, ability.radius, ability.area_max_height_difference)
        {
            let Some(victim) = self.state.character_at(tile) else {
                continue;
            };
            if victim.dead {
                continue;
            }
            let victim_id = victim.id;
            let amount = match self.state.character(caster) {
                Some(caster) => ability_damage(caster, ability, victim),
                None => continue,
            };
            self.damage(victim_id, amount, &ability.damage_tags);

            let Some(victim) = self.state.character_mut(victim_id) else {
                continue;
            };
            if victim.dead {
                continue;
            }
            for status in &ability.status_effects {
                victim.status.add(status.kind, status.duration);
            }
            for status in &ability.status_effects {
                self.emit(BattleEvent::StatusApplied {
                    character: victim_id,
                    kind: status.kind,
                    duration: status.duration,
                });
            }
        }
    }

    fn damage(&mut self, id: CharacterId, amount: i32, tags: &TagSet) {
        let Some(character) = self.state.character_mut(id) else {
            return;
        };
        if character.dead {
            return;
        }
        let outcome = apply_damage(character, amount, tags, true);
        let hp = character.hp;
        self.emit(BattleEvent::Damaged {
            character: id,
            amount: outcome.dealt,
            hp,
            killed: outcome.killed,
        });
        if outcome.killed {
            tracing::info!(character = %id, "character died");
        }
    }
}
