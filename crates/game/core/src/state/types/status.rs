//! Status effects carried by characters.
//!
//! Durations count the affected character's own turns: each end of turn
//! decrements every effect by one, and effects reaching zero are removed.
//! The rendering index cycles through active effects for display and is
//! reset whenever the list changes shape.

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Kinds of status effect understood by the rules.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEffectKind {
    /// Halves incoming attack and ability damage.
    Wall,
    /// Forces autonomous action with friendly and hostile targets swapped.
    Charm,
    /// Forces autonomous action; each target evaluation may be inverted.
    Confuse,
    /// Deals a fraction of max HP at the start of each turn.
    Poison,
}

/// A single active effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Remaining turns.
    pub duration: i32,
}

/// Active status effects on a character.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
    rendering_index: usize,
    rendering_timer: f32,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn duration(&self, kind: StatusEffectKind) -> Option<i32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.duration)
    }

    /// Index of the effect currently shown by a renderer.
    pub fn rendering_index(&self) -> usize {
        self.rendering_index
    }

    /// Adds an effect, keeping the longer duration if it is already active.
    pub fn add(&mut self, kind: StatusEffectKind, duration: i32) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.duration = existing.duration.max(duration);
        } else if !self.effects.is_full() {
            self.effects.push(StatusEffect { kind, duration });
        }
        self.rendering_index = 0;
    }

    /// Removes an effect. Returns true if it was present.
    pub fn remove(&mut self, kind: StatusEffectKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.rendering_index = 0;
        self.effects.len() != before
    }

    /// Decrements every duration by one and drops expired effects.
    ///
    /// Returns the kinds that expired, each reported once.
    pub fn decrement(&mut self) -> ArrayVec<StatusEffectKind, { GameConfig::MAX_STATUS_EFFECTS }> {
        let mut expired = ArrayVec::new();
        let mut index = 0;
        while index < self.effects.len() {
            self.effects[index].duration -= 1;
            if self.effects[index].duration <= 0 {
                let removed = self.effects.swap_remove(index);
                expired.push(removed.kind);
                self.rendering_index = 0;
            } else {
                index += 1;
            }
        }
        expired
    }

    /// Advances the display cycle; one effect is shown per second.
    pub fn advance_rendering(&mut self, delta_seconds: f32) {
        self.rendering_timer += delta_seconds;
        if self.rendering_timer >= 1.0 {
            self.rendering_timer = 0.0;
            self.rendering_index += 1;
            if self.rendering_index >= self.effects.len() {
                self.rendering_index = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_existing_effect_keeps_longer_duration() {
        let mut effects = StatusEffects::empty();
        effects.add(StatusEffectKind::Poison, 3);
        effects.add(StatusEffectKind::Poison, 2);
        assert_eq!(effects.duration(StatusEffectKind::Poison), Some(3));
        effects.add(StatusEffectKind::Poison, 5);
        assert_eq!(effects.duration(StatusEffectKind::Poison), Some(5));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn expired_effect_is_removed_exactly_once() {
        let mut effects = StatusEffects::empty();
        effects.add(StatusEffectKind::Wall, 1);
        effects.add(StatusEffectKind::Charm, 2);
        effects.add(StatusEffectKind::Confuse, 1);

        effects.advance_rendering(1.0);
        assert_eq!(effects.rendering_index(), 1);

        let expired = effects.decrement();
        assert_eq!(expired.len(), 2);
        assert!(expired.contains(&StatusEffectKind::Wall));
        assert!(expired.contains(&StatusEffectKind::Confuse));
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.rendering_index(), 0);

        let expired = effects.decrement();
        assert_eq!(expired.as_slice(), &[StatusEffectKind::Charm]);
        assert!(effects.is_empty());

        assert!(effects.decrement().is_empty());
    }

    #[test]
    fn add_and_remove_reset_rendering_index() {
        let mut effects = StatusEffects::empty();
        effects.add(StatusEffectKind::Wall, 4);
        effects.add(StatusEffectKind::Poison, 4);
        effects.advance_rendering(1.5);
        assert_eq!(effects.rendering_index(), 1);

        effects.add(StatusEffectKind::Charm, 1);
        assert_eq!(effects.rendering_index(), 0);

        effects.advance_rendering(1.0);
        assert_eq!(effects.rendering_index(), 1);
        assert!(effects.remove(StatusEffectKind::Wall));
        assert_eq!(effects.rendering_index(), 0);
        assert!(!effects.remove(StatusEffectKind::Wall));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("poison".parse::<StatusEffectKind>(), Ok(StatusEffectKind::Poison));
        assert_eq!("WALL".parse::<StatusEffectKind>(), Ok(StatusEffectKind::Wall));
        assert!("haste".parse::<StatusEffectKind>().is_err());
    }
}
