//! Characters placed on the battle grid.

use std::collections::BTreeMap;

use super::{
    CharacterId, Equipment, PlayerId, Position, Stats, StatusEffectKind, StatusEffects, TagSet,
    TileTypeId,
};
use crate::ai::Behavior;
use crate::env::AbilityId;

/// Who decides what a character does on its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    /// Commands come from the owning player.
    #[default]
    Player,
    /// Commands come from the behavior evaluator.
    Ai,
}

/// Where an ability is aimed.
///
/// A character target follows the character if it moves before the ability
/// resolves; a tile target stays put.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityTarget {
    Character(CharacterId),
    Tile(Position),
}

/// An ability chosen on an earlier turn, waiting for CT to charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAbility {
    pub ability: AbilityId,
    pub target: AbilityTarget,
}

/// Damage typing: tags matched against the damage tags of each hit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageAffinities {
    /// Each matching tag doubles the damage.
    pub weaknesses: TagSet,
    /// Each matching tag halves the damage.
    pub resistances: TagSet,
    /// Any matching tag nullifies the damage.
    pub immunities: TagSet,
}

/// Animation timings in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimTimings {
    pub melee_time_before_hit: f32,
    pub spell_time_before_hit: f32,
    pub ranged_time_before_hit: f32,
    pub attack_duration: f32,
    pub ability_duration: f32,
    pub hit_duration: f32,
}

impl Default for AnimTimings {
    fn default() -> Self {
        Self {
            melee_time_before_hit: 1.0,
            spell_time_before_hit: 1.0,
            ranged_time_before_hit: 1.0,
            attack_duration: 1.5,
            ability_duration: 1.5,
            hit_duration: 0.5,
        }
    }
}

/// Timed transition a character is currently playing out.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionState {
    #[default]
    Idle,
    /// Walking a path; `path` is a stack whose last entry is the next tile.
    Moving { path: Vec<Position>, progress: f32 },
    Attacking {
        target: CharacterId,
        elapsed: f32,
        hit_applied: bool,
    },
    UsingAbility {
        elapsed: f32,
        hit_applied: bool,
        effect_played: bool,
    },
    /// Hit reaction after taking damage while idle.
    Hit { elapsed: f32 },
}

impl ActionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ActionState::Idle)
    }
}

/// A combatant.
///
/// `tile` and the occupant field of that tile always point at each other;
/// [`crate::state::BattleState`] is the only place that changes either.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub owner: PlayerId,
    pub controller: Controller,
    pub faction: String,
    pub base_stats: Stats,
    pub equipment: Vec<Equipment>,
    pub hp: i32,
    pub mp: i32,
    pub ct: i32,
    pub tile: Option<Position>,
    pub status: StatusEffects,
    pub behaviors: Vec<Behavior>,
    pub abilities: Vec<AbilityId>,
    pub targeted: Option<CharacterId>,
    pub pending_ability: Option<PendingAbility>,
    pub path_biases: BTreeMap<TileTypeId, f32>,
    pub tags: TagSet,
    pub affinities: DamageAffinities,
    pub attack_range: i32,
    pub max_attack_height_difference: f32,
    pub timings: AnimTimings,
    pub action: ActionState,
    pub dead: bool,
}

impl Character {
    pub const DEFAULT_ATTACK_RANGE: i32 = 1;
    pub const DEFAULT_MAX_ATTACK_HEIGHT_DIFFERENCE: f32 = 2.0;

    /// Creates a character at full health. The id is reassigned on placement.
    pub fn new(name: impl Into<String>, faction: impl Into<String>, stats: Stats) -> Self {
        Self {
            id: CharacterId::FIRST,
            name: name.into(),
            owner: PlayerId::HOST,
            controller: Controller::Player,
            faction: faction.into(),
            base_stats: stats,
            equipment: Vec::new(),
            hp: stats.max_hp,
            mp: stats.max_mp,
            ct: 0,
            tile: None,
            status: StatusEffects::empty(),
            behaviors: Vec::new(),
            abilities: Vec::new(),
            targeted: None,
            pending_ability: None,
            path_biases: BTreeMap::new(),
            tags: TagSet::new(),
            affinities: DamageAffinities::default(),
            attack_range: Self::DEFAULT_ATTACK_RANGE,
            max_attack_height_difference: Self::DEFAULT_MAX_ATTACK_HEIGHT_DIFFERENCE,
            timings: AnimTimings::default(),
            action: ActionState::Idle,
            dead: false,
        }
    }

    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_behaviors(mut self, behaviors: Vec<Behavior>) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn with_abilities(mut self, abilities: Vec<AbilityId>) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_ct(mut self, ct: i32) -> Self {
        self.ct = ct;
        self
    }

    /// Base stats plus every equipment modifier.
    pub fn stats(&self) -> Stats {
        self.equipment
            .iter()
            .fold(self.base_stats, |acc, item| acc + item.modifiers)
    }

    /// Damage types of basic attacks: every tag carried by worn equipment.
    pub fn attack_damage_tags(&self) -> TagSet {
        self.equipment
            .iter()
            .flat_map(|item| item.damage_tags.iter())
            .collect()
    }

    pub fn max_hp(&self) -> i32 {
        self.stats().max_hp
    }

    pub fn speed(&self) -> i32 {
        self.stats().speed
    }

    pub fn move_range(&self) -> i32 {
        self.stats().movement
    }

    pub fn jump(&self) -> f32 {
        self.stats().jump as f32
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn has_status(&self, kind: StatusEffectKind) -> bool {
        self.status.has(kind)
    }

    /// Confusion and charm take control away from the owning player.
    pub fn is_mind_controlled(&self) -> bool {
        self.has_status(StatusEffectKind::Confuse) || self.has_status(StatusEffectKind::Charm)
    }

    /// Extra path cost this character pays on tiles of `kind`.
    pub fn path_bias(&self, kind: TileTypeId) -> f32 {
        self.path_biases.get(&kind).copied().unwrap_or(0.0)
    }

    /// Looks up an ability by its slot, treating out-of-range slots as none.
    pub fn ability_at(&self, slot: u8) -> Option<AbilityId> {
        self.abilities.get(usize::from(slot)).copied()
    }

    /// Slot of `ability` in this character's list.
    pub fn ability_slot(&self, ability: AbilityId) -> Option<u8> {
        self.abilities
            .iter()
            .position(|&a| a == ability)
            .and_then(|slot| u8::try_from(slot).ok())
    }

    pub fn hp_fraction(&self) -> f32 {
        let max = self.max_hp();
        if max <= 0 {
            0.0
        } else {
            self.hp as f32 / max as f32
        }
    }
}
