//! Utility AI.
//!
//! Each [`Behavior`] scores itself from a tile with a side-effect free
//! utility function and, when chosen, produces a [`Decision`]. The engine
//! dispatches the decision through the same command path as player input,
//! but AI decisions never enter the command queue: every peer (and every
//! replay) re-derives them from the shared seed.
//!
//! The only state touched while scoring is the RNG, which confusion draws
//! from; the evaluator works on a copy that the engine writes back.

mod behavior;
mod utility;

pub use behavior::Behavior;
pub use utility::{
    UtilityContext, ability_utility, attack_utility, best_ability_target, best_attack_target,
    best_tile_to_approach, close_to_attack_utility, flee_utility, projected_ability_damage,
};

use crate::command::Command;
use crate::config::GameConfig;
use crate::env::{ContentRegistry, PcgRng, RandomSource};
use crate::pathfinding::{Mover, generate_path, reachable_tiles};
use crate::state::{AbilityTarget, BattleState, CharacterId, Position};

/// What the chosen behavior wants to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Dispatch a command for the acting character.
    Command(Command),
    /// End the turn without acting (residual CT 0).
    Pass,
}

/// Index of the behavior with strictly the greatest utility; the first one
/// seen wins ties. `None` if every behavior scores -1 or below.
pub fn choose_behavior(ctx: &mut UtilityContext<'_>, actor: CharacterId) -> Option<usize> {
    let state = ctx.state;
    let character = state.character(actor)?;
    let from = character.tile?;
    let mut best = None;
    let mut max_utility = -1.0;
    for (index, behavior) in character.behaviors.iter().enumerate() {
        let utility = behavior.utility(ctx, character, from);
        if utility > max_utility {
            max_utility = utility;
            best = Some(index);
        }
    }
    if let Some(index) = best {
        tracing::debug!(
            character = %actor,
            behavior = %character.behaviors[index],
            utility = max_utility,
            "behavior chosen"
        );
    }
    best
}

/// Turns a chosen behavior into a decision for `actor`.
///
/// Needs the state mutably only because path searches stamp tile scratch
/// markers.
pub fn act(
    state: &mut BattleState,
    content: &ContentRegistry,
    config: &GameConfig,
    rng: &mut PcgRng,
    actor: CharacterId,
    behavior: &Behavior,
) -> Decision {
    if let Behavior::Flee { .. } = behavior {
        return match flee_destination(state, config, rng, actor) {
            Some(destination) => Decision::Command(Command::Move { actor, destination }),
            None => Decision::Command(Command::Wait { actor }),
        };
    }

    let state: &BattleState = state;
    let Some(character) = state.character(actor) else {
        return Decision::Pass;
    };
    let Some(origin) = character.tile else {
        return Decision::Pass;
    };
    let mut ctx = UtilityContext {
        state,
        content,
        config,
        rng,
    };

    match behavior {
        Behavior::Wait => Decision::Command(Command::Wait { actor }),
        Behavior::Attack => match best_attack_target(&mut ctx, character, origin) {
            (_, Some(target)) => Decision::Command(Command::Attack { actor, target }),
            _ => Decision::Pass,
        },
        Behavior::CloseToAttack { .. } => match best_tile_to_approach(&mut ctx, character, origin) {
            (_, Some(destination)) => Decision::Command(Command::Move { actor, destination }),
            _ => Decision::Pass,
        },
        Behavior::Ability => match best_ability_target(&mut ctx, character, origin) {
            Some((slot, tile)) => {
                let target = match state.grid.tile(tile).and_then(|t| t.occupant) {
                    Some(occupant) => AbilityTarget::Character(occupant),
                    None => AbilityTarget::Tile(tile),
                };
                Decision::Command(Command::UseAbility { actor, slot, target })
            }
            None => Decision::Pass,
        },
        Behavior::Flee { .. } => Decision::Command(Command::Wait { actor }),
    }
}

/// Picks the farthest of a handful of random free tiles from the character
/// being fled, paths toward it, and stops where the move budget runs out.
fn flee_destination(
    state: &mut BattleState,
    config: &GameConfig,
    rng: &mut impl RandomSource,
    actor: CharacterId,
) -> Option<Position> {
    let character = state.character(actor)?;
    let origin = character.tile?;
    let threat = character
        .targeted
        .and_then(|id| state.character(id))
        .and_then(|c| c.tile)?;
    let mover = Mover::of(character);
    let budget = usize::try_from(character.move_range()).unwrap_or(0);
    let reach = reachable_tiles(&state.grid, character, None);

    let mut goal = None;
    let mut farthest = 0;
    for _ in 0..config.flee_candidates {
        let Some(candidate) = state.random_free_tile(rng, config.random_tile_attempts) else {
            continue;
        };
        let distance = candidate.manhattan_distance(threat);
        if distance > farthest {
            farthest = distance;
            goal = Some(candidate);
        }
    }

    let path = generate_path(&mut state.grid, &mover, origin, goal?);
    let steps = budget.min(path.len());
    if steps == 0 {
        return None;
    }
    let destination = path[path.len() - steps];
    reach.contains(&destination).then_some(destination)
}
