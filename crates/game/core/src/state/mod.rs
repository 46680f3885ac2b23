//! Authoritative battle state.
//!
//! [`BattleState`] owns the grid, every character (arena storage in index
//! order) and the match RNG. Tiles and characters refer to each other only
//! through [`Position`] and [`CharacterId`] handles, and the methods here are
//! the only code that changes those cross references.
mod grid;
pub mod types;

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::env::{PcgRng, RandomSource};
pub use grid::{Grid, MapDimensions};
pub use types::{
    AbilityTarget, ActionState, AnimTimings, CardinalDirection, Character, CharacterId,
    Controller, DamageAffinities, Equipment, PendingAbility, PlayerId, Position, StatKind, Stats,
    StatusEffect, StatusEffectKind, StatusEffects, TagSet, Tile, TileFlags, TileTypeId,
};

/// Failure to put a character on the grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("tile {0} is outside the map")]
    OutOfBounds(Position),

    #[error("tile {0} is already occupied")]
    Occupied(Position),

    #[error("no character indices left on this map")]
    RosterFull,
}

/// Turn bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Character whose turn is in progress.
    pub active: Option<CharacterId>,
    /// The active character is waiting for a command from its owner.
    pub awaiting_input: bool,
    /// Scheduler ticks elapsed since the match started.
    pub ticks: u64,
}

/// Canonical state of one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// Seed the RNG started from; written to replays.
    pub seed: u32,
    pub grid: Grid,
    characters: Vec<Character>,
    pub rng: PcgRng,
    pub turn: TurnState,
    next_character_index: u8,
}

impl BattleState {
    pub fn new(seed: u32, grid: Grid) -> Self {
        Self {
            seed,
            grid,
            characters: Vec::new(),
            rng: PcgRng::seeded(seed),
            turn: TurnState::default(),
            next_character_index: CharacterId::FIRST.0,
        }
    }

    /// Characters in container order, which is also index order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub(crate) fn characters_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    pub fn character_ids(&self) -> Vec<CharacterId> {
        self.characters.iter().map(|c| c.id).collect()
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn character_at(&self, position: Position) -> Option<&Character> {
        self.grid
            .tile(position)
            .and_then(|tile| tile.occupant)
            .and_then(|id| self.character(id))
    }

    /// Places a new character, assigning the next free index.
    pub fn place_character(
        &mut self,
        mut character: Character,
        position: Position,
    ) -> Result<CharacterId, PlacementError> {
        let tile = self
            .grid
            .tile_mut(position)
            .ok_or(PlacementError::OutOfBounds(position))?;
        if tile.is_occupied() {
            return Err(PlacementError::Occupied(position));
        }
        if self.next_character_index == 0 {
            return Err(PlacementError::RosterFull);
        }

        let id = CharacterId(self.next_character_index);
        self.next_character_index = self.next_character_index.wrapping_add(1);

        tile.occupant = Some(id);
        character.id = id;
        character.tile = Some(position);
        tracing::debug!(character = %id, name = %character.name, %position, "placed character");
        self.characters.push(character);
        Ok(id)
    }

    /// Moves a character one hop, keeping tile and character in sync.
    ///
    /// Fails without side effects if the destination is off the grid,
    /// occupied, or solid to the character.
    pub fn move_character(&mut self, id: CharacterId, destination: Position) -> bool {
        let Some(character) = self.character(id) else {
            return false;
        };
        let origin = character.tile;
        match self.grid.tile(destination) {
            Some(tile) if !tile.is_occupied() && !tile.is_solid_to(&character.tags) => {}
            _ => return false,
        }

        if let Some(origin) = origin.and_then(|pos| self.grid.tile_mut(pos)) {
            origin.occupant = None;
        }
        if let Some(tile) = self.grid.tile_mut(destination) {
            tile.occupant = Some(id);
        }
        if let Some(character) = self.character_mut(id) {
            character.tile = Some(destination);
        }
        true
    }

    /// Permanently removes a character and clears every reference to it.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == id)?;
        let removed = self.characters.remove(index);

        if let Some(tile) = removed.tile.and_then(|pos| self.grid.tile_mut(pos)) {
            tile.occupant = None;
        }
        for other in &mut self.characters {
            if other.targeted == Some(id) {
                other.targeted = None;
            }
            if let Some(pending) = other.pending_ability.as_mut()
                && pending.target == AbilityTarget::Character(id)
            {
                pending.target = match removed.tile {
                    Some(pos) => AbilityTarget::Tile(pos),
                    None => AbilityTarget::Character(id),
                };
            }
        }
        if self.turn.active == Some(id) {
            self.turn.active = None;
            self.turn.awaiting_input = false;
        }
        tracing::debug!(character = %id, name = %removed.name, "removed character");
        Some(removed)
    }

    /// Nearest living character (Manhattan) whose faction satisfies `accept`.
    /// Ties resolve to the first in tile order.
    fn nearest_where(&self, from: Position, accept: impl Fn(&Character) -> bool) -> Option<CharacterId> {
        let mut best: Option<(i32, CharacterId)> = None;
        for tile in self.grid.tiles() {
            let Some(character) = tile.occupant.and_then(|id| self.character(id)) else {
                continue;
            };
            if !character.is_alive() || !accept(character) {
                continue;
            }
            let distance = from.manhattan_distance(tile.position);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, character.id));
            }
        }
        best.map(|(_, id)| id)
    }

    pub fn nearest_character_of_faction(&self, from: Position, faction: &str) -> Option<CharacterId> {
        self.nearest_where(from, |c| c.faction == faction)
    }

    pub fn nearest_character_not_of_faction(
        &self,
        from: Position,
        faction: &str,
    ) -> Option<CharacterId> {
        self.nearest_where(from, |c| c.faction != faction)
    }

    /// Living characters of `faction`, in tile order.
    pub fn characters_of_faction(&self, faction: &str) -> Vec<CharacterId> {
        self.occupants_where(|c| c.faction == faction)
    }

    pub fn characters_not_of_faction(&self, faction: &str) -> Vec<CharacterId> {
        self.occupants_where(|c| c.faction != faction)
    }

    fn occupants_where(&self, accept: impl Fn(&Character) -> bool) -> Vec<CharacterId> {
        self.grid
            .tiles()
            .iter()
            .filter_map(|tile| tile.occupant.and_then(|id| self.character(id)))
            .filter(|c| c.is_alive() && accept(c))
            .map(|c| c.id)
            .collect()
    }

    /// Samples a non-solid, unoccupied tile, giving up after `attempts` draws.
    pub fn random_free_tile(&self, rng: &mut impl RandomSource, attempts: u32) -> Option<Position> {
        let count = u32::try_from(self.grid.len()).ok()?;
        if count == 0 {
            return None;
        }
        for _ in 0..attempts {
            let index = rng.below(count) as usize;
            let tile = &self.grid.tiles()[index];
            if !tile.flags.contains(TileFlags::SOLID) && !tile.is_occupied() {
                return Some(tile.position);
            }
        }
        None
    }

    /// Owners that still have a living character.
    pub fn surviving_owners(&self) -> BTreeSet<PlayerId> {
        self.characters
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.owner)
            .collect()
    }

    /// The winning owner once only one owner has living characters.
    pub fn victor(&self) -> Option<PlayerId> {
        let owners = self.surviving_owners();
        if owners.len() == 1 {
            owners.into_iter().next()
        } else {
            None
        }
    }

    /// SHA-256 over every rule-relevant field, for lockstep comparisons.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(self.rng.state().to_le_bytes());
        hasher.update(self.turn.ticks.to_le_bytes());
        hasher.update([CharacterId::to_wire(self.turn.active)]);
        for c in &self.characters {
            hasher.update([c.id.0, u8::from(c.dead)]);
            hasher.update(c.hp.to_le_bytes());
            hasher.update(c.mp.to_le_bytes());
            hasher.update(c.ct.to_le_bytes());
            let tile = c.tile.unwrap_or(Position::new(-1, -1));
            hasher.update(tile.x.to_le_bytes());
            hasher.update(tile.y.to_le_bytes());
            for effect in c.status.iter() {
                hasher.update([effect.kind as u8]);
                hasher.update(effect.duration.to_le_bytes());
            }
            hasher.update([CharacterId::to_wire(c.targeted)]);
            hasher.update([u8::from(c.pending_ability.is_some())]);
        }
        for tile in self.grid.tiles() {
            hasher.update([CharacterId::to_wire(tile.occupant)]);
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn battle() -> BattleState {
        let grid = Grid::new(
            MapDimensions::new(5, 5),
            TileTypeId(0),
            TileFlags::empty(),
            GameConfig::DEFAULT_TILE_HEIGHT,
        );
        BattleState::new(9, grid)
    }

    fn fighter(faction: &str) -> Character {
        Character::new("fighter", faction, Stats {
            max_hp: 10,
            speed: 5,
            ..Stats::default()
        })
    }

    #[test]
    fn placement_assigns_sequential_indices_and_links_tile() {
        let mut state = battle();
        let a = state.place_character(fighter("red"), Position::new(0, 0)).unwrap();
        let b = state.place_character(fighter("blue"), Position::new(1, 0)).unwrap();
        assert_eq!(a, CharacterId(1));
        assert_eq!(b, CharacterId(2));
        assert_eq!(state.grid.tile(Position::new(1, 0)).unwrap().occupant, Some(b));
        assert_eq!(
            state.place_character(fighter("red"), Position::new(1, 0)),
            Err(PlacementError::Occupied(Position::new(1, 0)))
        );
    }

    #[test]
    fn moving_keeps_cross_references_in_sync() {
        let mut state = battle();
        let a = state.place_character(fighter("red"), Position::new(0, 0)).unwrap();
        assert!(state.move_character(a, Position::new(0, 1)));
        assert_eq!(state.grid.tile(Position::new(0, 0)).unwrap().occupant, None);
        assert_eq!(state.grid.tile(Position::new(0, 1)).unwrap().occupant, Some(a));
        assert_eq!(state.character(a).unwrap().tile, Some(Position::new(0, 1)));
        assert!(!state.move_character(a, Position::new(9, 9)));
    }

    #[test]
    fn removal_clears_targets_and_tile() {
        let mut state = battle();
        let a = state.place_character(fighter("red"), Position::new(0, 0)).unwrap();
        let b = state.place_character(fighter("blue"), Position::new(2, 2)).unwrap();
        state.character_mut(a).unwrap().targeted = Some(b);

        let removed = state.remove_character(b).unwrap();
        assert_eq!(removed.id, b);
        assert_eq!(state.character(a).unwrap().targeted, None);
        assert!(!state.grid.tile(Position::new(2, 2)).unwrap().is_occupied());
        assert_eq!(state.characters().len(), 1);
    }

    #[test]
    fn nearest_enemy_ignores_allies_and_dead() {
        let mut state = battle();
        state.place_character(fighter("red"), Position::new(0, 0)).unwrap();
        let ally = state.place_character(fighter("red"), Position::new(0, 1)).unwrap();
        let near = state.place_character(fighter("blue"), Position::new(1, 1)).unwrap();
        let far = state.place_character(fighter("blue"), Position::new(4, 4)).unwrap();
        assert_eq!(state.nearest_character_not_of_faction(Position::ORIGIN, "red"), Some(near));
        assert_eq!(state.nearest_character_of_faction(Position::new(0, 2), "red"), Some(ally));

        state.character_mut(near).unwrap().dead = true;
        assert_eq!(state.nearest_character_not_of_faction(Position::ORIGIN, "red"), Some(far));
    }

    #[test]
    fn victor_requires_a_single_surviving_owner() {
        let mut state = battle();
        let a = state
            .place_character(fighter("red").with_owner(PlayerId(0)), Position::new(0, 0))
            .unwrap();
        state
            .place_character(fighter("blue").with_owner(PlayerId(1)), Position::new(4, 4))
            .unwrap();
        assert_eq!(state.victor(), None);
        state.character_mut(a).unwrap().dead = true;
        assert_eq!(state.victor(), Some(PlayerId(1)));
    }

    #[test]
    fn random_free_tile_skips_solid_and_occupied() {
        let mut state = battle();
        for y in 0..5 {
            for x in 0..5 {
                if (x, y) != (3, 3) {
                    state.grid.tile_mut(Position::new(x, y)).unwrap().flags = TileFlags::SOLID;
                }
            }
        }
        let mut rng = PcgRng::seeded(4);
        assert_eq!(state.random_free_tile(&mut rng, 10_000), Some(Position::new(3, 3)));
        state.place_character(fighter("red"), Position::new(3, 3)).unwrap();
        assert_eq!(state.random_free_tile(&mut rng, 50), None);
    }
}
