//! A* over the battle grid.
//!
//! A search can be driven one expansion at a time with [`PathSearch::step`]
//! or run to completion with [`generate_path`]. Paths are returned goal
//! first, start excluded, so callers pop the next tile off the end.

use std::collections::HashMap;

use super::Mover;
use crate::state::{Grid, Position};

/// Result of a single expansion step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The goal has not been reached and open nodes remain.
    Pending,
    /// Tiles from goal back to (excluding) start.
    Found(Vec<Position>),
    /// The open set emptied without reaching the goal.
    Exhausted,
}

#[derive(Clone, Debug)]
struct OpenNode {
    position: Position,
    parent: Option<usize>,
    /// Accumulated cost from the start.
    g: f32,
    /// Manhattan estimate to the goal.
    h: f32,
}

impl OpenNode {
    fn score(&self) -> f32 {
        self.g + self.h
    }
}

/// In-progress A* search.
///
/// Open and closed membership lives on the tiles, tagged with this search's
/// generation id, so no tile state needs clearing between searches.
#[derive(Clone, Debug)]
pub struct PathSearch {
    generation: u32,
    goal: Position,
    mover: Mover,
    nodes: Vec<OpenNode>,
    /// Node indices in insertion order.
    open: Vec<usize>,
    by_tile: HashMap<usize, usize>,
    finished: bool,
}

impl PathSearch {
    /// Opens the start node and claims a fresh generation id from the grid.
    pub fn start(grid: &mut Grid, mover: Mover, start: Position, goal: Position) -> Self {
        let generation = grid.next_path_generation();
        let mut search = Self {
            generation,
            goal,
            mover,
            nodes: Vec::new(),
            open: Vec::new(),
            by_tile: HashMap::new(),
            finished: false,
        };

        match (grid.index_of(start), grid.contains(goal)) {
            (Some(index), true) => {
                search.open_node(grid, index, start, None, 0.0);
            }
            _ => search.finished = true,
        }
        search
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Expands the lowest-scoring open node.
    pub fn step(&mut self, grid: &mut Grid) -> StepOutcome {
        if self.finished {
            return StepOutcome::Exhausted;
        }

        // Lowest f wins; the earliest opened node wins ties.
        let Some(slot) = self
            .open
            .iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| {
                self.nodes[**a]
                    .score()
                    .total_cmp(&self.nodes[**b].score())
                    .then(ia.cmp(ib))
            })
            .map(|(slot, _)| slot)
        else {
            self.finished = true;
            return StepOutcome::Exhausted;
        };

        let current = self.open.remove(slot);
        let position = self.nodes[current].position;
        if let Some(tile) = grid.tile_mut(position) {
            tile.closed_in = self.generation;
        }

        if position == self.goal {
            self.finished = true;
            return StepOutcome::Found(self.reconstruct(current));
        }

        let Some(from) = grid.tile(position).cloned() else {
            return StepOutcome::Pending;
        };
        for neighbor in grid.neighbors(position) {
            let Some(index) = grid.index_of(neighbor) else {
                continue;
            };
            let tile = &grid.tiles()[index];
            if tile.closed_in == self.generation || !self.mover.can_enter(&from, tile) {
                continue;
            }
            let g = self.nodes[current].g + self.mover.cost(tile);

            if tile.open_in == self.generation {
                if let Some(&existing) = self.by_tile.get(&index)
                    && g < self.nodes[existing].g
                {
                    self.nodes[existing].g = g;
                    self.nodes[existing].parent = Some(current);
                }
            } else {
                self.open_node(grid, index, neighbor, Some(current), g);
            }
        }

        if self.open.is_empty() {
            self.finished = true;
            return StepOutcome::Exhausted;
        }
        StepOutcome::Pending
    }

    /// Steps until the search finishes. Returns an empty path if no path exists.
    pub fn run(&mut self, grid: &mut Grid) -> Vec<Position> {
        loop {
            match self.step(grid) {
                StepOutcome::Pending => continue,
                StepOutcome::Found(path) => return path,
                StepOutcome::Exhausted => return Vec::new(),
            }
        }
    }

    fn open_node(
        &mut self,
        grid: &mut Grid,
        index: usize,
        position: Position,
        parent: Option<usize>,
        g: f32,
    ) {
        let node = self.nodes.len();
        self.nodes.push(OpenNode {
            position,
            parent,
            g,
            h: position.manhattan_distance(self.goal) as f32,
        });
        self.open.push(node);
        self.by_tile.insert(index, node);
        grid.tiles_mut()[index].open_in = self.generation;
    }

    fn reconstruct(&self, goal_node: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cursor = goal_node;
        while let Some(parent) = self.nodes[cursor].parent {
            path.push(self.nodes[cursor].position);
            cursor = parent;
        }
        path
    }
}

/// Runs a complete search from `start` to `goal` for `mover`.
pub fn generate_path(grid: &mut Grid, mover: &Mover, start: Position, goal: Position) -> Vec<Position> {
    let path = PathSearch::start(grid, mover.clone(), start, goal).run(grid);
    tracing::trace!(%start, %goal, length = path.len(), "path search finished");
    path
}
