//! Utility scoring.
//!
//! Net damage is the sum over affected characters of damage dealt, with the
//! sign flipped for allies, flipped again when the actor is charmed, and
//! flipped with even odds per evaluation when the actor is confused.

use crate::combat::{ability_damage, attack_damage};
use crate::config::GameConfig;
use crate::env::{AbilityDefinition, ContentRegistry, PcgRng, RandomSource};
use crate::pathfinding::reachable_tiles;
use crate::state::{BattleState, Character, Position, StatusEffectKind};

/// Read-only view of the battle plus the RNG draws made while scoring.
pub struct UtilityContext<'a> {
    pub state: &'a BattleState,
    pub content: &'a ContentRegistry,
    pub config: &'a GameConfig,
    pub rng: &'a mut PcgRng,
}

impl UtilityContext<'_> {
    /// Applies the ally / charm / confuse sign rules to `amount` dealt by
    /// `actor` to `target`.
    pub(crate) fn net(&mut self, actor: &Character, target: &Character, amount: i32) -> i32 {
        let mut amount = amount;
        if target.faction == actor.faction {
            amount = -amount;
        }
        if actor.has_status(StatusEffectKind::Charm) {
            amount = -amount;
        }
        if actor.has_status(StatusEffectKind::Confuse) && self.rng.chance(0.5) {
            amount = -amount;
        }
        amount
    }
}

/// Best basic-attack net damage from `from`, and the character it hits.
/// Only positive results select a target.
pub fn best_attack_target(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    from: Position,
) -> (i32, Option<crate::state::CharacterId>) {
    let state = ctx.state;
    let mut best = (0, None);
    for tile in state
        .grid
        .targetable_tiles(from, actor.attack_range, actor.max_attack_height_difference)
    {
        let Some(target) = state.character_at(tile) else {
            continue;
        };
        if target.id == actor.id || !target.is_alive() {
            continue;
        }
        let damage = ctx.net(actor, target, attack_damage(actor, target));
        if damage > best.0 {
            best = (damage, Some(target.id));
        }
    }
    best
}

pub fn attack_utility(ctx: &mut UtilityContext<'_>, actor: &Character, from: Position) -> f32 {
    best_attack_target(ctx, actor, from).0 as f32
}

/// Net damage of `ability` cast by `actor` at `center`, without touching
/// the state. Healing is capped at each target's missing HP.
pub fn projected_ability_damage(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    ability: &AbilityDefinition,
    center: Position,
) -> i32 {
    let state = ctx.state;
    let mut total = 0;
    for tile in state
        .grid
        .aoe_tiles(center, ability.radius, ability.area_max_height_difference)
    {
        let Some(target) = state.character_at(tile) else {
            continue;
        };
        if !target.is_alive() {
            continue;
        }
        let mut damage = ability_damage(actor, ability, target);
        if target.hp - damage > target.max_hp() {
            damage = target.hp - target.max_hp();
        }
        total += ctx.net(actor, target, damage);
    }
    total
}

/// Best ability slot and target tile from `from`, if any scores above zero.
pub fn best_ability_target(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    from: Position,
) -> Option<(u8, Position)> {
    best_ability(ctx, actor, from).1
}

fn best_ability(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    from: Position,
) -> (i32, Option<(u8, Position)>) {
    let content = ctx.content;
    let state = ctx.state;
    let mut best = (0, None);
    for (slot, &id) in actor.abilities.iter().enumerate() {
        let (Some(ability), Ok(slot)) = (content.ability(id), u8::try_from(slot)) else {
            continue;
        };
        for tile in state
            .grid
            .targetable_tiles(from, ability.range, ability.max_height_difference)
        {
            let damage = projected_ability_damage(ctx, actor, ability, tile);
            if damage > best.0 {
                best = (damage, Some((slot, tile)));
            }
        }
    }
    best
}

pub fn ability_utility(ctx: &mut UtilityContext<'_>, actor: &Character, from: Position) -> f32 {
    best_ability(ctx, actor, from).0 as f32
}

/// Reachable tile from which the actor's other behaviors score best after
/// subtracting the distance to the nearest enemy.
pub fn best_tile_to_approach(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    from: Position,
) -> (f32, Option<Position>) {
    let state = ctx.state;
    let mut best = (-99_999.0, None);
    for tile in reachable_tiles(&state.grid, actor, Some(from)) {
        let distance = state
            .nearest_character_not_of_faction(tile, &actor.faction)
            .and_then(|id| state.character(id))
            .and_then(|enemy| enemy.tile)
            .map_or(0, |enemy_tile| enemy_tile.manhattan_distance(tile));
        for behavior in actor.behaviors.iter().filter(|b| !b.is_close_to_attack()) {
            let utility = behavior.utility(ctx, actor, tile) - distance as f32;
            if utility > best.0 {
                best = (utility, Some(tile));
            }
        }
    }
    best
}

pub fn close_to_attack_utility(
    ctx: &mut UtilityContext<'_>,
    actor: &Character,
    from: Position,
    baseline: f32,
) -> f32 {
    let (best, _) = best_tile_to_approach(ctx, actor, from);
    (best * ctx.config.close_to_attack_scale).max(baseline)
}

/// Zero at full health rising to `cowardice` at zero health; -1 when the
/// actor has nobody targeted.
pub fn flee_utility(actor: &Character, cowardice: f32) -> f32 {
    if actor.targeted.is_none() {
        return -1.0;
    }
    cowardice * (1.0 - actor.hp_fraction())
}
