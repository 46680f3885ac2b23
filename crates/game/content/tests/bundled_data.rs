//! The data directory shipped with the repository loads and builds.

use std::path::PathBuf;

use game_content::ContentFactory;
use game_core::{Controller, PlayerId, Position, TileFlags};

fn factory() -> ContentFactory {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data");
    ContentFactory::new(root)
}

#[test]
fn every_bundled_map_builds() {
    let factory = factory();
    let registry = factory.load_registry().expect("registry");
    let maps = factory.load_maps().expect("maps");
    assert!(!maps.is_empty());

    for map in &maps {
        let state = map.build(&registry, 7).expect("build");
        assert_eq!(state.surviving_owners().len(), 2, "map {}", map.name);
    }
}

#[test]
fn ford_has_a_pit_only_flyers_cross() {
    let factory = factory();
    let registry = factory.load_registry().unwrap();
    let state = factory.build_battle(&registry, "ford", 1).unwrap();

    let pit = state.grid.tile(Position::new(7, 1)).unwrap();
    assert!(pit.flags.contains(TileFlags::SOLID));
    let bat = state.characters().iter().find(|c| c.name == "bat").unwrap();
    assert!(!pit.is_solid_to(&bat.tags));
    let raider = state.characters().iter().find(|c| c.name == "raider").unwrap();
    assert!(pit.is_solid_to(&raider.tags));
}

#[test]
fn spawn_controller_overrides_template() {
    let factory = factory();
    let registry = factory.load_registry().unwrap();
    let state = factory.build_battle(&registry, "skirmish", 3).unwrap();
    for character in state.characters() {
        if character.owner == PlayerId(0) {
            assert_eq!(character.controller, Controller::Ai);
        }
    }
}

#[test]
fn bundled_config_matches_defaults() {
    let config = factory().load_config().unwrap();
    assert_eq!(config, game_core::GameConfig::default());
}
