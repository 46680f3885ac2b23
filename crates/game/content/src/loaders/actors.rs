//! Character template loader.

use std::path::Path;

use game_core::CharacterTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Character catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterCatalog {
    pub characters: Vec<CharacterTemplate>,
}

/// Loader for character templates from RON files.
///
/// Ability and tile names inside templates are only resolved once the
/// registry holds every tile and ability, see
/// [`game_core::ContentRegistry::validate`].
pub struct ActorLoader;

impl ActorLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<CharacterTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<CharacterTemplate>> {
        let catalog: CharacterCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse character catalog RON: {}", e))?;
        Ok(catalog.characters)
    }
}

#[cfg(test)]
mod tests {
    use game_core::{Behavior, Controller};

    use super::*;

    #[test]
    fn parses_behaviors_with_optional_parameters() {
        let templates = ActorLoader::parse(
            r#"(characters: [(
                name: "goblin",
                faction: "greenskin",
                controller: Ai,
                min_stats: (max_hp: 20, speed: 6, movement: 4, jump: 2, attack: 5),
                max_stats: (max_hp: 26, speed: 9, movement: 4, jump: 2, attack: 7),
                behaviors: [
                    Attack,
                    CloseToAttack(baseline: None),
                    Flee(cowardice: Some(0.9)),
                ],
                path_biases: {"water": 3.0},
                affinities: (weaknesses: ["fire"]),
            )])"#,
        )
        .unwrap();
        let goblin = &templates[0];
        assert_eq!(goblin.controller, Controller::Ai);
        assert_eq!(goblin.attack_range, 1);
        assert_eq!(goblin.behaviors[2], Behavior::Flee {
            cowardice: Some(0.9)
        });
        assert!(goblin.affinities.weaknesses.contains("fire"));
        assert_eq!(goblin.path_biases["water"], 3.0);
    }

    #[test]
    fn unknown_behavior_is_an_error() {
        let result = ActorLoader::parse(
            r#"(characters: [(
                name: "x", faction: "y",
                min_stats: (max_hp: 1), max_stats: (max_hp: 1),
                behaviors: [Dance],
            )])"#,
        );
        assert!(result.is_err());
    }
}
