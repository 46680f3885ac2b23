//! Damage calculation and application.

use crate::config::GameConfig;
use crate::env::AbilityDefinition;
use crate::state::{ActionState, Character, DamageAffinities, StatusEffectKind, TagSet};

/// What a call to [`apply_damage`] did to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage after affinities; negative values healed.
    pub dealt: i32,
    /// The target entered its hit reaction.
    pub staggered: bool,
    /// This application brought the target to zero HP.
    pub killed: bool,
}

fn halve_for_wall(target: &Character, amount: f32) -> f32 {
    if target.has_status(StatusEffectKind::Wall) {
        amount * 0.5
    } else {
        amount
    }
}

/// Basic attack damage of `attacker` against `target`.
///
/// ```text
/// damage = attack                 (stats + equipment)
/// damage = trunc(damage * 0.5)    if the target has Wall
/// ```
pub fn attack_damage(attacker: &Character, target: &Character) -> i32 {
    halve_for_wall(target, attacker.stats().attack as f32) as i32
}

/// Power multiplier from faith: 0.25 at faith 0 rising linearly to 2.0 at 100.
pub fn faith_multiplier(faith: i32) -> f32 {
    let (low, high) = GameConfig::FAITH_POWER_RANGE;
    low + (high - low) * (faith as f32 / 100.0)
}

/// Damage (negative: healing) of `ability` cast by `caster` on `target`.
pub fn ability_damage(caster: &Character, ability: &AbilityDefinition, target: &Character) -> i32 {
    let power = faith_multiplier(caster.stats().faith) * ability.power as f32;
    halve_for_wall(target, power) as i32
}

fn matches_entry(tags: &TagSet, entry: &str) -> bool {
    match entry.strip_prefix('!') {
        Some(forbidden) => !tags.contains(forbidden),
        None => tags.contains(entry),
    }
}

/// Damage multiplier from the target's affinities against `damage_tags`.
///
/// Each matching weakness doubles, each matching resistance halves, and
/// any matching immunity zeroes the result.
pub fn affinity_modifier(affinities: &DamageAffinities, damage_tags: &TagSet) -> f32 {
    let mut modifier = 1.0;
    for weakness in affinities.weaknesses.iter() {
        if matches_entry(damage_tags, weakness) {
            modifier *= 2.0;
        }
    }
    for resistance in affinities.resistances.iter() {
        if matches_entry(damage_tags, resistance) {
            modifier *= 0.5;
        }
    }
    if affinities
        .immunities
        .iter()
        .any(|immunity| matches_entry(damage_tags, immunity))
    {
        modifier = 0.0;
    }
    modifier
}

/// Applies `amount` damage typed by `damage_tags` to `target`.
///
/// HP is clamped to `[0, max_hp]`; reaching zero marks the target dead.
/// Positive damage staggers an idle target when `hit_reaction` is set.
/// Characters that are already dead are left untouched.
pub fn apply_damage(
    target: &mut Character,
    amount: i32,
    damage_tags: &TagSet,
    hit_reaction: bool,
) -> DamageOutcome {
    if target.dead {
        return DamageOutcome::default();
    }

    let dealt = (amount as f32 * affinity_modifier(&target.affinities, damage_tags)).floor() as i32;
    let staggered = hit_reaction && dealt > 0 && target.action.is_idle();
    if staggered {
        target.action = ActionState::Hit { elapsed: 0.0 };
    }

    target.hp = (target.hp - dealt).min(target.max_hp());
    let killed = target.hp <= 0;
    if killed {
        target.hp = 0;
        target.dead = true;
    }

    tracing::debug!(
        target = %target.id,
        dealt,
        hp = target.hp,
        killed,
        "damage applied"
    );
    DamageOutcome {
        dealt,
        staggered,
        killed,
    }
}
