//! Rectangular tile grid.
//!
//! Tiles are stored row-major (`index = y * width + x`) and never move once
//! the grid is built. Every cross-reference elsewhere in the state is a
//! [`Position`] or index into this storage.

use arrayvec::ArrayVec;

use super::{CardinalDirection, Position, TagSet, Tile, TileFlags, TileTypeId};

/// Width and height of a grid in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// The battle grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    dimensions: MapDimensions,
    tiles: Vec<Tile>,
    /// Last generation id handed to a path search.
    path_generation: u32,
}

impl Grid {
    /// Builds a grid filled with a single tile type at a uniform height.
    pub fn new(dimensions: MapDimensions, fill: TileTypeId, flags: TileFlags, height: f32) -> Self {
        let mut tiles = Vec::with_capacity(dimensions.area());
        for y in 0..dimensions.height as i32 {
            for x in 0..dimensions.width as i32 {
                tiles.push(Tile::new(Position::new(x, y), height, fill, flags));
            }
        }
        Self {
            dimensions,
            tiles,
            path_generation: 0,
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.dimensions.width
            && (position.y as u32) < self.dimensions.height
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position).then(|| {
            (position.y as usize) * (self.dimensions.width as usize) + position.x as usize
        })
    }

    pub fn position_of(&self, index: usize) -> Position {
        let width = self.dimensions.width.max(1) as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.index_of(position).map(|index| &self.tiles[index])
    }

    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.index_of(position).map(move |index| &mut self.tiles[index])
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// In-bounds orthogonal neighbours in N, E, S, W order.
    pub fn neighbors(&self, position: Position) -> ArrayVec<Position, 4> {
        CardinalDirection::ALL
            .iter()
            .map(|&direction| position.step(direction))
            .filter(|&neighbor| self.contains(neighbor))
            .collect()
    }

    /// Hands out a fresh, never-before-used path search id.
    pub(crate) fn next_path_generation(&mut self) -> u32 {
        self.path_generation = self.path_generation.wrapping_add(1);
        if self.path_generation == 0 {
            // Wrapped: clear markers so old ids cannot alias new ones.
            for tile in &mut self.tiles {
                tile.open_in = 0;
                tile.closed_in = 0;
            }
            self.path_generation = 1;
        }
        self.path_generation
    }

    /// Reassigns a tile's type. Returns false if `position` is off the grid.
    pub fn set_tile_type(
        &mut self,
        position: Position,
        kind: TileTypeId,
        flags: TileFlags,
        solid_exceptions: &TagSet,
    ) -> bool {
        match self.tile_mut(position) {
            Some(tile) => {
                tile.kind = kind;
                tile.flags = flags;
                tile.solid_exceptions = solid_exceptions.clone();
                true
            }
            None => false,
        }
    }

    pub fn set_height(&mut self, position: Position, height: f32) -> bool {
        match self.tile_mut(position) {
            Some(tile) => {
                tile.height = height;
                true
            }
            None => false,
        }
    }

    /// Tiles whose centres lie within a Euclidean `radius` of `center`'s centre.
    pub fn tiles_in_radius(&self, center: Position, radius: f32) -> Vec<Position> {
        let reach = radius as i32;
        let max_distance_squared = radius * radius;
        let mut out = Vec::new();
        for y in (center.y - reach)..=(center.y + reach) {
            for x in (center.x - reach)..=(center.x + reach) {
                let candidate = Position::new(x, y);
                if !self.contains(candidate) {
                    continue;
                }
                let dx = (x - center.x) as f32;
                let dy = (y - center.y) as f32;
                if dx * dx + dy * dy <= max_distance_squared {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Tiles within Manhattan `range` of `origin` whose height differs by at
    /// most `max_height_difference`. Includes `origin` itself.
    pub fn targetable_tiles(
        &self,
        origin: Position,
        range: i32,
        max_height_difference: f32,
    ) -> Vec<Position> {
        self.tiles_within(origin, range, max_height_difference)
    }

    /// Tiles affected by an area effect centred on `center`.
    pub fn aoe_tiles(
        &self,
        center: Position,
        radius: i32,
        area_max_height_difference: f32,
    ) -> Vec<Position> {
        self.tiles_within(center, radius, area_max_height_difference)
    }

    fn tiles_within(&self, origin: Position, distance: i32, max_height_difference: f32) -> Vec<Position> {
        let Some(start) = self.tile(origin) else {
            return Vec::new();
        };
        self.tiles
            .iter()
            .filter(|tile| {
                origin.manhattan_distance(tile.position) <= distance
                    && (start.height - tile.height).abs() <= max_height_difference
            })
            .map(|tile| tile.position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32) -> Grid {
        Grid::new(
            MapDimensions::new(width, height),
            TileTypeId(0),
            TileFlags::empty(),
            5.0,
        )
    }

    #[test]
    fn index_round_trips_through_position() {
        let grid = flat(4, 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.index_of(Position::new(1, 2)), Some(9));
        assert_eq!(grid.position_of(9), Position::new(1, 2));
        assert_eq!(grid.index_of(Position::new(4, 0)), None);
        assert_eq!(grid.index_of(Position::new(0, -1)), None);
    }

    #[test]
    fn neighbors_follow_expansion_order_and_clip_edges() {
        let grid = flat(3, 3);
        assert_eq!(
            grid.neighbors(Position::new(1, 1)).as_slice(),
            &[
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(0, 1)
            ]
        );
        assert_eq!(
            grid.neighbors(Position::ORIGIN).as_slice(),
            &[Position::new(0, 1), Position::new(1, 0)]
        );
    }

    #[test]
    fn targetable_tiles_respect_height_difference() {
        let mut grid = flat(5, 1);
        grid.set_height(Position::new(1, 0), 8.0);
        let tiles = grid.targetable_tiles(Position::ORIGIN, 2, 2.0);
        assert_eq!(tiles, vec![Position::new(0, 0), Position::new(2, 0)]);
    }

    #[test]
    fn radius_query_is_euclidean() {
        let grid = flat(5, 5);
        let tiles = grid.tiles_in_radius(Position::new(2, 2), 1.0);
        assert_eq!(tiles.len(), 5);
        assert!(!tiles.contains(&Position::new(3, 3)));
    }

    #[test]
    fn path_generations_are_unique() {
        let mut grid = flat(2, 2);
        let first = grid.next_path_generation();
        let second = grid.next_path_generation();
        assert_ne!(first, second);
        assert_ne!(first, 0);
    }
}
