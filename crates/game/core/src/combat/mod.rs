//! Combat resolution.
//!
//! Pure damage arithmetic plus the single mutation point for hit points,
//! [`apply_damage`]. Projections used by the AI call the same functions so
//! predicted and applied numbers cannot drift apart.

pub mod damage;

pub use damage::{
    DamageOutcome, ability_damage, affinity_modifier, apply_damage, attack_damage, faith_multiplier,
};
