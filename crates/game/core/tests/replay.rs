//! A recorded command stream replays into the same battle.

use game_core::{
    BattleEvent, BattleState, Behavior, Character, Command, CommandQueue, ContentRegistry,
    Controller, GameConfig, GameEngine, Grid, MapDimensions, PlayerId, Position, ReplayLog, Stats,
    TileFlags, TileTypeId,
};

const FRAME: f32 = 0.05;
const FRAMES: usize = 2_000;

fn battle(seed: u32) -> BattleState {
    let grid = Grid::new(
        MapDimensions::new(6, 6),
        TileTypeId(0),
        TileFlags::empty(),
        GameConfig::DEFAULT_TILE_HEIGHT,
    );
    let mut state = BattleState::new(seed, grid);
    let stats = Stats {
        max_hp: 16,
        attack: 3,
        movement: 3,
        jump: 1,
        speed: 9,
        ..Stats::default()
    };
    state
        .place_character(
            Character::new("knight", "red", stats).with_owner(PlayerId(0)),
            Position::new(0, 0),
        )
        .unwrap();
    state
        .place_character(
            Character::new("raider", "blue", Stats { speed: 7, ..stats })
                .with_owner(PlayerId(1))
                .with_controller(Controller::Ai)
                .with_behaviors(vec![
                    Behavior::Attack,
                    Behavior::CloseToAttack { baseline: None },
                    Behavior::Flee { cowardice: None },
                ]),
            Position::new(5, 5),
        )
        .unwrap();
    state
}

/// Attack the nearest enemy if it is in reach, otherwise walk toward it or wait.
fn player_command(engine: &GameEngine<'_>, actor: game_core::CharacterId) -> Command {
    let state = engine.state();
    let character = state.character(actor).unwrap();
    let from = character.tile.unwrap();
    if let Some(enemy) = state.nearest_character_not_of_faction(from, &character.faction) {
        let attack = Command::Attack { actor, target: enemy };
        if engine.validate(&attack).is_ok() {
            return attack;
        }
        let enemy_tile = state.character(enemy).and_then(|c| c.tile).unwrap();
        let step = game_core::pathfinding::reachable_tiles(&state.grid, character, None)
            .into_iter()
            .min_by_key(|tile| tile.manhattan_distance(enemy_tile));
        if let Some(destination) = step {
            return Command::Move { actor, destination };
        }
    }
    Command::Wait { actor }
}

fn live(seed: u32) -> (Vec<[u8; 32]>, Vec<Command>) {
    let content = ContentRegistry::new();
    let config = GameConfig::default();
    let mut state = battle(seed);
    let mut queue = CommandQueue::default();
    let mut digests = Vec::new();
    for _ in 0..FRAMES {
        if state.surviving_owners().len() <= 1 {
            break;
        }
        let mut engine = GameEngine::new(&mut state, &content, &config);
        let events = engine.advance(&mut queue, FRAME).unwrap();
        for event in events {
            if let BattleEvent::AwaitingInput { character, .. } = event {
                queue.push(player_command(&engine, character));
            }
        }
        digests.push(state.digest());
    }
    (digests, queue.take_history())
}

fn replay(log: ReplayLog) -> Vec<[u8; 32]> {
    let content = ContentRegistry::new();
    let config = GameConfig::default();
    let mut state = battle(log.seed);
    let mut queue = CommandQueue::replay(log.commands);
    let mut digests = Vec::new();
    for _ in 0..FRAMES {
        if state.surviving_owners().len() <= 1 {
            break;
        }
        GameEngine::new(&mut state, &content, &config)
            .advance(&mut queue, FRAME)
            .unwrap();
        digests.push(state.digest());
    }
    digests
}

#[test]
fn replay_reproduces_the_live_match() {
    let (live_digests, history) = live(2024);
    assert!(!history.is_empty());

    let bytes = ReplayLog::new(2024, history.clone()).encode().unwrap();
    let log = ReplayLog::decode(&bytes).unwrap();
    assert_eq!(log.commands, history);

    assert_eq!(replay(log), live_digests);
}
