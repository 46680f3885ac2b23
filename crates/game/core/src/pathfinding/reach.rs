//! Bounded reachability.
//!
//! Breadth-first distance labelling from an origin tile, limited to the
//! mover's move budget. Occupied tiles are never labelled, so they neither
//! appear in the result nor relay movement.

use std::collections::VecDeque;

use super::Mover;
use crate::state::{Character, Grid, Position};

/// Step distance from `origin` to every tile within `budget`, indexed like
/// [`Grid::tiles`]. `None` means unreachable within the budget.
pub fn distance_field(grid: &Grid, mover: &Mover, origin: Position, budget: i32) -> Vec<Option<u32>> {
    let mut labels = vec![None; grid.len()];
    let Some(start) = grid.index_of(origin) else {
        return labels;
    };
    let budget = u32::try_from(budget).unwrap_or(0);
    labels[start] = Some(0);

    let mut frontier = VecDeque::from([start]);
    while let Some(index) = frontier.pop_front() {
        let Some(distance) = labels[index] else {
            continue;
        };
        if distance >= budget {
            continue;
        }
        let from = &grid.tiles()[index];
        for neighbor in grid.neighbors(from.position) {
            let Some(next) = grid.index_of(neighbor) else {
                continue;
            };
            if labels[next].is_some() || !mover.can_enter(from, &grid.tiles()[next]) {
                continue;
            }
            labels[next] = Some(distance + 1);
            frontier.push_back(next);
        }
    }
    labels
}

/// Tiles `mover` can walk to from `origin` in at most `budget` steps, in grid
/// order. The origin itself is excluded.
pub fn reachable_tiles_within(grid: &Grid, mover: &Mover, origin: Position, budget: i32) -> Vec<Position> {
    distance_field(grid, mover, origin, budget)
        .into_iter()
        .enumerate()
        .filter(|(index, label)| {
            matches!(label, Some(d) if *d >= 1) && !grid.tiles()[*index].is_occupied()
        })
        .map(|(index, _)| grid.position_of(index))
        .collect()
}

/// Tiles `character` can move to this turn, from its own tile or from a
/// hypothetical `origin`.
pub fn reachable_tiles(grid: &Grid, character: &Character, origin: Option<Position>) -> Vec<Position> {
    let Some(origin) = origin.or(character.tile) else {
        return Vec::new();
    };
    reachable_tiles_within(grid, &Mover::of(character), origin, character.move_range())
}
