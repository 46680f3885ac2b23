//! The closed set of AI behaviors.

use super::utility::{
    UtilityContext, ability_utility, attack_utility, close_to_attack_utility, flee_utility,
};
use crate::state::{Character, Position};

/// A decision strategy attached to a character.
///
/// Optional parameters fall back to [`crate::config::GameConfig`].
#[derive(Clone, Debug, PartialEq, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    Wait,
    Attack,
    /// Move to the tile from which the other behaviors score best.
    CloseToAttack {
        #[cfg_attr(feature = "serde", serde(default))]
        baseline: Option<f32>,
    },
    /// Run from the targeted character as health drops.
    Flee {
        #[cfg_attr(feature = "serde", serde(default))]
        cowardice: Option<f32>,
    },
    /// Cast the ability with the best projected net damage.
    Ability,
}

impl Behavior {
    pub fn is_close_to_attack(&self) -> bool {
        matches!(self, Behavior::CloseToAttack { .. })
    }

    /// Desirability of this behavior if `actor` acted from `from`.
    pub fn utility(&self, ctx: &mut UtilityContext<'_>, actor: &Character, from: Position) -> f32 {
        match self {
            Behavior::Wait => ctx.config.wait_utility,
            Behavior::Attack => attack_utility(ctx, actor, from),
            Behavior::CloseToAttack { baseline } => {
                let baseline = baseline.unwrap_or(ctx.config.close_to_attack_baseline);
                close_to_attack_utility(ctx, actor, from, baseline)
            }
            Behavior::Flee { cowardice } => {
                flee_utility(actor, cowardice.unwrap_or(ctx.config.default_cowardice))
            }
            Behavior::Ability => ability_utility(ctx, actor, from),
        }
    }
}
