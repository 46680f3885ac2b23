//! Character templates.
//!
//! A template gives inclusive stat ranges; every spawn rolls concrete stats
//! from the match RNG, so the seed fixes the whole roster.

use std::collections::BTreeMap;

use super::{ContentError, ContentRegistry};
use crate::ai::Behavior;
use crate::env::RandomSource;
use crate::state::{
    AnimTimings, Character, Controller, DamageAffinities, Equipment, StatKind, Stats, TagSet,
};

fn default_attack_range() -> i32 {
    Character::DEFAULT_ATTACK_RANGE
}

fn default_max_attack_height_difference() -> f32 {
    Character::DEFAULT_MAX_ATTACK_HEIGHT_DIFFERENCE
}

/// Data-driven recipe for building a [`Character`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterTemplate {
    pub name: String,
    pub faction: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub controller: Controller,
    pub min_stats: Stats,
    pub max_stats: Stats,
    #[cfg_attr(feature = "serde", serde(default = "default_attack_range"))]
    pub attack_range: i32,
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_max_attack_height_difference")
    )]
    pub max_attack_height_difference: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timings: AnimTimings,
    /// Ability names, resolved against the registry at spawn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behaviors: Vec<Behavior>,
    /// Extra path cost per tile type name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub path_biases: BTreeMap<String, f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affinities: DamageAffinities,
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipment: Vec<Equipment>,
}

impl CharacterTemplate {
    /// Template with fixed stats (min == max).
    pub fn fixed(name: impl Into<String>, faction: impl Into<String>, stats: Stats) -> Self {
        Self {
            name: name.into(),
            faction: faction.into(),
            controller: Controller::Ai,
            min_stats: stats,
            max_stats: stats,
            attack_range: default_attack_range(),
            max_attack_height_difference: default_max_attack_height_difference(),
            timings: AnimTimings::default(),
            abilities: Vec::new(),
            behaviors: Vec::new(),
            path_biases: BTreeMap::new(),
            tags: TagSet::new(),
            affinities: DamageAffinities::default(),
            equipment: Vec::new(),
        }
    }

    /// Rolls stats and resolves names into a ready-to-place character.
    pub fn spawn(
        &self,
        registry: &ContentRegistry,
        rng: &mut impl RandomSource,
    ) -> Result<Character, ContentError> {
        let mut stats = Stats::default();
        for kind in ROLL_ORDER {
            let value = rng.range_i32(self.min_stats.get(kind), self.max_stats.get(kind));
            stats.set(kind, value);
        }

        let abilities = self
            .abilities
            .iter()
            .map(|name| {
                registry
                    .ability_id(name)
                    .ok_or_else(|| ContentError::UnknownAbility(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut path_biases = BTreeMap::new();
        for (tile_name, bias) in &self.path_biases {
            let kind = registry
                .tile_id(tile_name)
                .ok_or_else(|| ContentError::UnknownTile(tile_name.clone()))?;
            path_biases.insert(kind, *bias);
        }

        let mut character = Character::new(self.name.clone(), self.faction.clone(), stats)
            .with_controller(self.controller)
            .with_abilities(abilities)
            .with_behaviors(self.behaviors.clone())
            .with_tags(self.tags.clone());
        character.equipment = self.equipment.clone();
        character.hp = character.max_hp();
        character.mp = character.stats().max_mp;
        character.path_biases = path_biases;
        character.affinities = self.affinities.clone();
        character.attack_range = self.attack_range;
        character.max_attack_height_difference = self.max_attack_height_difference;
        character.timings = self.timings;
        Ok(character)
    }

    pub(crate) fn validate(&self, registry: &ContentRegistry) -> Result<(), ContentError> {
        let invalid = |reason: String| ContentError::invalid("character", &self.name, reason);
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        for kind in ROLL_ORDER {
            if self.min_stats.get(kind) > self.max_stats.get(kind) {
                return Err(invalid(format!("min {kind} exceeds max {kind}")));
            }
        }
        if self.min_stats.max_hp <= 0 {
            return Err(invalid("max_hp must be positive".into()));
        }
        if self.attack_range < 0 || self.max_attack_height_difference < 0.0 {
            return Err(invalid("attack reach must not be negative".into()));
        }
        if let Some(name) = self.abilities.iter().find(|n| registry.ability_id(n).is_none()) {
            return Err(ContentError::UnknownAbility(name.clone()));
        }
        if let Some(name) = self.path_biases.keys().find(|n| registry.tile_id(n).is_none()) {
            return Err(ContentError::UnknownTile(name.clone()));
        }
        Ok(())
    }
}

const ROLL_ORDER: [StatKind; 9] = [
    StatKind::Bravery,
    StatKind::Faith,
    StatKind::Move,
    StatKind::Jump,
    StatKind::Speed,
    StatKind::Attack,
    StatKind::Evasion,
    StatKind::MaxHp,
    StatKind::MaxMp,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AbilityDefinition, PcgRng, TileDefinition};

    fn registry() -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        registry.register_tile(TileDefinition::new("grass")).unwrap();
        registry.register_tile(TileDefinition::new("mud")).unwrap();
        registry
            .register_ability(AbilityDefinition::new("fire", 12, 25))
            .unwrap();
        registry
    }

    fn ranged_template() -> CharacterTemplate {
        let mut template = CharacterTemplate::fixed("imp", "red", Stats::default());
        template.min_stats = Stats {
            speed: 5,
            max_hp: 20,
            ..Stats::default()
        };
        template.max_stats = Stats {
            speed: 9,
            max_hp: 30,
            ..Stats::default()
        };
        template
    }

    #[test]
    fn spawn_rolls_within_ranges_deterministically() {
        let registry = registry();
        let template = ranged_template();
        let mut a = PcgRng::seeded(11);
        let mut b = PcgRng::seeded(11);
        let first = template.spawn(&registry, &mut a).unwrap();
        let second = template.spawn(&registry, &mut b).unwrap();
        assert_eq!(first.base_stats, second.base_stats);
        assert!((5..=9).contains(&first.speed()));
        assert!((20..=30).contains(&first.max_hp()));
        assert_eq!(first.hp, first.max_hp());
    }

    #[test]
    fn spawn_resolves_names() {
        let registry = registry();
        let mut template = CharacterTemplate::fixed("mage", "blue", Stats {
            max_hp: 10,
            ..Stats::default()
        });
        template.abilities.push("fire".into());
        template.path_biases.insert("mud".into(), 2.5);
        let mage = template.spawn(&registry, &mut PcgRng::seeded(1)).unwrap();
        assert_eq!(mage.abilities.len(), 1);
        assert_eq!(mage.path_bias(registry.tile_id("mud").unwrap()), 2.5);
        assert_eq!(mage.path_bias(registry.tile_id("grass").unwrap()), 0.0);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = registry();
        let mut template = ranged_template();
        template.abilities.push("meteor".into());
        assert_eq!(
            template.validate(&registry),
            Err(ContentError::UnknownAbility("meteor".into()))
        );
    }
}
