//! Read-only content registry.
//!
//! Built once at startup, then shared by reference with every component that
//! needs to resolve a name or id. Nothing mutates it during a match.

use std::collections::HashMap;

use super::{
    AbilityDefinition, AbilityId, CharacterTemplate, ContentError, TileDefinition,
};
use crate::state::TileTypeId;

#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    tiles: Vec<TileDefinition>,
    tile_names: HashMap<String, TileTypeId>,
    abilities: Vec<AbilityDefinition>,
    ability_names: HashMap<String, AbilityId>,
    characters: Vec<CharacterTemplate>,
    character_names: HashMap<String, usize>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tile(&mut self, definition: TileDefinition) -> Result<TileTypeId, ContentError> {
        definition.validate()?;
        if self.tile_names.contains_key(&definition.name) {
            return Err(ContentError::Duplicate {
                kind: "tile",
                name: definition.name,
            });
        }
        let id = TileTypeId(
            u16::try_from(self.tiles.len())
                .map_err(|_| ContentError::invalid("tile", &definition.name, "too many tile types"))?,
        );
        self.tile_names.insert(definition.name.clone(), id);
        self.tiles.push(definition);
        Ok(id)
    }

    pub fn register_ability(
        &mut self,
        definition: AbilityDefinition,
    ) -> Result<AbilityId, ContentError> {
        definition.validate()?;
        if self.ability_names.contains_key(&definition.name) {
            return Err(ContentError::Duplicate {
                kind: "ability",
                name: definition.name,
            });
        }
        let id = AbilityId(u16::try_from(self.abilities.len()).map_err(|_| {
            ContentError::invalid("ability", &definition.name, "too many abilities")
        })?);
        self.ability_names.insert(definition.name.clone(), id);
        self.abilities.push(definition);
        Ok(id)
    }

    /// Registers a template. Name references are checked by [`Self::validate`]
    /// once every tile and ability is known.
    pub fn register_character(&mut self, template: CharacterTemplate) -> Result<(), ContentError> {
        if self.character_names.contains_key(&template.name) {
            return Err(ContentError::Duplicate {
                kind: "character",
                name: template.name,
            });
        }
        self.character_names
            .insert(template.name.clone(), self.characters.len());
        self.characters.push(template);
        Ok(())
    }

    /// Checks cross references between definitions.
    pub fn validate(&self) -> Result<(), ContentError> {
        for template in &self.characters {
            template.validate(self)?;
        }
        Ok(())
    }

    pub fn tile_id(&self, name: &str) -> Option<TileTypeId> {
        self.tile_names.get(name).copied()
    }

    pub fn tile(&self, id: TileTypeId) -> Option<&TileDefinition> {
        self.tiles.get(usize::from(id.0))
    }

    pub fn tile_by_name(&self, name: &str) -> Result<(TileTypeId, &TileDefinition), ContentError> {
        self.tile_id(name)
            .and_then(|id| self.tile(id).map(|def| (id, def)))
            .ok_or_else(|| ContentError::UnknownTile(name.to_string()))
    }

    pub fn ability_id(&self, name: &str) -> Option<AbilityId> {
        self.ability_names.get(name).copied()
    }

    pub fn ability(&self, id: AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(usize::from(id.0))
    }

    pub fn character(&self, name: &str) -> Result<&CharacterTemplate, ContentError> {
        self.character_names
            .get(name)
            .map(|&index| &self.characters[index])
            .ok_or_else(|| ContentError::UnknownCharacter(name.to_string()))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileTypeId, &TileDefinition)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, def)| (TileTypeId(index as u16), def))
    }

    pub fn abilities(&self) -> impl Iterator<Item = (AbilityId, &AbilityDefinition)> {
        self.abilities
            .iter()
            .enumerate()
            .map(|(index, def)| (AbilityId(index as u16), def))
    }

    pub fn characters(&self) -> impl Iterator<Item = &CharacterTemplate> {
        self.characters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_assigned_in_registration_order() {
        let mut registry = ContentRegistry::new();
        assert_eq!(
            registry.register_tile(TileDefinition::new("grass")),
            Ok(TileTypeId(0))
        );
        assert_eq!(
            registry.register_tile(TileDefinition::new("rock").solid()),
            Ok(TileTypeId(1))
        );
        assert!(registry.tile(TileTypeId(1)).unwrap().solid);
        assert_eq!(registry.tile_id("grass"), Some(TileTypeId(0)));
    }

    #[test]
    fn duplicates_are_fatal() {
        let mut registry = ContentRegistry::new();
        registry.register_tile(TileDefinition::new("grass")).unwrap();
        assert!(matches!(
            registry.register_tile(TileDefinition::new("grass")),
            Err(ContentError::Duplicate { kind: "tile", .. })
        ));
    }
}
