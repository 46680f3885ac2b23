//! Rule tunables loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameConfig`] tunables from TOML files.
///
/// Missing keys keep their defaults, so an empty file is valid.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.max_delta_seconds <= 0.0 || config.move_tiles_per_second <= 0.0 {
            anyhow::bail!("max_delta_seconds and move_tiles_per_second must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = ConfigLoader::parse("default_cowardice = 0.9\n").unwrap();
        assert_eq!(config.default_cowardice, 0.9);
        assert_eq!(config.wait_utility, GameConfig::DEFAULT_WAIT_UTILITY);
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(ConfigLoader::parse("max_delta_seconds = 0.0\n").is_err());
    }
}
