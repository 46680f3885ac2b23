//! Grid tiles.

use super::{CharacterId, Position, TagSet};

bitflags::bitflags! {
    /// Static properties copied from a tile type when it is assigned.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFlags: u8 {
        const SOLID = 1 << 0;
        const OPAQUE = 1 << 1;
    }
}

/// Index of a tile type in the content registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileTypeId(pub u16);

/// One cell of the battle grid.
///
/// `open_in` / `closed_in` hold the generation id of the last path search
/// that touched the tile, so stale markers from earlier searches never need
/// clearing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub position: Position,
    pub height: f32,
    pub kind: TileTypeId,
    pub flags: TileFlags,
    /// Tag query that flips the type's solidity for matching characters.
    pub solid_exceptions: TagSet,
    pub occupant: Option<CharacterId>,
    pub(crate) open_in: u32,
    pub(crate) closed_in: u32,
}

impl Tile {
    pub fn new(position: Position, height: f32, kind: TileTypeId, flags: TileFlags) -> Self {
        Self {
            position,
            height,
            kind,
            flags,
            solid_exceptions: TagSet::new(),
            occupant: None,
            open_in: 0,
            closed_in: 0,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn is_opaque(&self) -> bool {
        self.flags.contains(TileFlags::OPAQUE)
    }

    /// Solidity as seen by a character carrying `tags`.
    pub fn is_solid_to(&self, tags: &TagSet) -> bool {
        let solid = self.flags.contains(TileFlags::SOLID);
        if !self.solid_exceptions.is_empty() && tags.matches(&self.solid_exceptions) {
            !solid
        } else {
            solid
        }
    }

    /// Ascending is capped by `jump`; descending any height is allowed.
    pub fn is_reachable_from_height(&self, origin_height: f32, jump: f32) -> bool {
        origin_height + jump >= self.height
    }

    /// Base movement cost before per-character biases.
    pub fn base_cost(&self) -> f32 {
        1.0
    }
}
