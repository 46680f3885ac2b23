//! Ability definitions.

use super::ContentError;
use crate::config::GameConfig;
use crate::state::{StatusEffectKind, TagSet};

/// Index of an ability in the content registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u16);

/// Which hit timing of the caster an ability uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimType {
    #[default]
    Melee,
    Spell,
    Ranged,
}

/// A status effect applied by an ability together with its duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedStatus {
    pub kind: StatusEffectKind,
    pub duration: i32,
}

/// Static description of an ability.
///
/// Negative `power` heals.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub name: String,
    pub range: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: i32,
    pub max_height_difference: f32,
    pub area_max_height_difference: f32,
    pub power: i32,
    /// CT gained per tick while the ability is charging. At or above the
    /// instant threshold the ability resolves on the turn it is chosen.
    pub speed: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_effects: Vec<AppliedStatus>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_tags: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub anim: AnimType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect_delay: f32,
}

impl AbilityDefinition {
    pub fn new(name: impl Into<String>, power: i32, speed: i32) -> Self {
        Self {
            name: name.into(),
            range: 3,
            radius: 0,
            max_height_difference: 3.0,
            area_max_height_difference: 3.0,
            power,
            speed,
            status_effects: Vec::new(),
            damage_tags: TagSet::new(),
            anim: AnimType::Spell,
            effect_delay: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: i32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range;
        self
    }

    pub fn with_status(mut self, kind: StatusEffectKind, duration: i32) -> Self {
        self.status_effects.push(AppliedStatus { kind, duration });
        self
    }

    /// Instant abilities resolve on the turn they are chosen.
    pub fn is_instant(&self) -> bool {
        self.speed >= GameConfig::CT_THRESHOLD
    }

    pub(crate) fn validate(&self) -> Result<(), ContentError> {
        let invalid = |reason: &str| ContentError::invalid("ability", &self.name, reason);
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.speed <= 0 {
            return Err(invalid("speed must be positive"));
        }
        if self.range < 0 || self.radius < 0 {
            return Err(invalid("range and radius must not be negative"));
        }
        if self.max_height_difference < 0.0 || self.area_max_height_difference < 0.0 {
            return Err(invalid("height differences must not be negative"));
        }
        if self.effect_delay < 0.0 {
            return Err(invalid("effect delay must not be negative"));
        }
        if self.status_effects.iter().any(|s| s.duration <= 0) {
            return Err(invalid("status durations must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_speed() {
        let ability = AbilityDefinition::new("stall", 4, 0);
        assert!(matches!(
            ability.validate(),
            Err(ContentError::Invalid { kind: "ability", .. })
        ));
        assert!(AbilityDefinition::new("fire", 4, 25).validate().is_ok());
    }

    #[test]
    fn instant_threshold_is_inclusive() {
        assert!(AbilityDefinition::new("quick", 1, 100).is_instant());
        assert!(!AbilityDefinition::new("slow", 1, 99).is_instant());
    }
}
