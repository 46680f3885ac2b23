//! Grid pathfinding: steppable A* and bounded reachability.
//!
//! Both searches share one traversal rule set, captured by [`Mover`]: a
//! tile can be entered from a neighbour if it is on the grid, unoccupied,
//! not solid to the mover's tags, and no higher than the origin tile plus
//! the mover's jump.
mod astar;
mod reach;

use std::collections::BTreeMap;

pub use astar::{PathSearch, StepOutcome, generate_path};
pub use reach::{distance_field, reachable_tiles, reachable_tiles_within};

use crate::state::{Character, TagSet, Tile, TileTypeId};

/// Traversal capabilities of a character, detached from the state so a
/// search can hold them while mutating tile scratch markers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mover {
    pub jump: f32,
    pub tags: TagSet,
    pub biases: BTreeMap<TileTypeId, f32>,
}

impl Mover {
    pub fn of(character: &Character) -> Self {
        Self {
            jump: character.jump(),
            tags: character.tags.clone(),
            biases: character.path_biases.clone(),
        }
    }

    pub fn with_jump(mut self, jump: f32) -> Self {
        self.jump = jump;
        self
    }

    /// Whether `to` can be entered from the adjacent tile `from`.
    pub fn can_enter(&self, from: &Tile, to: &Tile) -> bool {
        !to.is_occupied()
            && !to.is_solid_to(&self.tags)
            && to.is_reachable_from_height(from.height, self.jump)
    }

    /// Cost of stepping onto `tile`.
    pub fn cost(&self, tile: &Tile) -> f32 {
        tile.base_cost() + self.biases.get(&tile.kind).copied().unwrap_or(0.0)
    }
}
