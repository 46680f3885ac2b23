//! Tile type catalog loader.

use std::path::Path;

use game_core::TileDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Tile catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileCatalog {
    pub tiles: Vec<TileDefinition>,
}

/// Loader for tile types from RON files.
pub struct TileLoader;

impl TileLoader {
    /// Load tile types in declaration order; the order fixes their ids.
    pub fn load(path: &Path) -> LoadResult<Vec<TileDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<TileDefinition>> {
        let catalog: TileCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tile catalog RON: {}", e))?;
        Ok(catalog.tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solidity_and_exceptions() {
        let tiles = TileLoader::parse(
            r#"(tiles: [
                (name: "grass"),
                (name: "wall", solid: true, opaque: true, solid_exceptions: ["ghost"]),
            ])"#,
        )
        .unwrap();
        assert_eq!(tiles.len(), 2);
        assert!(!tiles[0].solid);
        assert!(tiles[1].solid && tiles[1].opaque);
        assert!(tiles[1].solid_exceptions.contains("ghost"));
    }
}
