//! Content factory for building battles from data files.

use std::path::{Path, PathBuf};

use game_core::{BattleState, ContentRegistry, GameConfig};

use crate::loaders::{
    AbilityLoader, ActorLoader, ConfigLoader, LoadResult, MapDefinition, MapLoader, TileLoader,
};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tiles.ron
/// ├── abilities.ron
/// ├── characters.ron
/// └── maps.ron
/// ```
///
/// Both peers of a match must load the same directory: tile and ability
/// ids come from declaration order.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load tunables from `config.toml`, falling back to defaults when the
    /// file is absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load tiles, abilities and characters into a validated registry.
    pub fn load_registry(&self) -> LoadResult<ContentRegistry> {
        let mut registry = ContentRegistry::new();

        for tile in TileLoader::load(&self.data_dir.join("tiles.ron"))? {
            registry.register_tile(tile)?;
        }
        for ability in AbilityLoader::load(&self.data_dir.join("abilities.ron"))? {
            registry.register_ability(ability)?;
        }
        for template in ActorLoader::load(&self.data_dir.join("characters.ron"))? {
            registry.register_character(template)?;
        }
        registry.validate()?;

        tracing::info!(
            tiles = registry.tiles().count(),
            abilities = registry.abilities().count(),
            characters = registry.characters().count(),
            "content loaded"
        );
        Ok(registry)
    }

    /// Load map definitions from `maps.ron`.
    pub fn load_maps(&self) -> LoadResult<Vec<MapDefinition>> {
        MapLoader::load(&self.data_dir.join("maps.ron"))
    }

    /// Build the named map for `seed`.
    pub fn build_battle(
        &self,
        registry: &ContentRegistry,
        map_name: &str,
        seed: u32,
    ) -> LoadResult<BattleState> {
        let maps = self.load_maps()?;
        let map = maps
            .iter()
            .find(|map| map.name == map_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown map: {}", map_name))?;
        map.build(registry, seed)
    }
}
