use super::*;
use crate::ai::Behavior;
use crate::command::{Command, CommandQueue};
use crate::env::AbilityDefinition;
use crate::state::{
    AbilityTarget, ActionState, Character, CharacterId, Controller, Grid, MapDimensions, Position,
    Stats, StatusEffectKind, TileFlags, TileTypeId,
};

struct Fixture {
    state: BattleState,
    content: ContentRegistry,
    config: GameConfig,
}

impl Fixture {
    fn new() -> Self {
        let grid = Grid::new(
            MapDimensions::new(6, 6),
            TileTypeId(0),
            TileFlags::empty(),
            GameConfig::DEFAULT_TILE_HEIGHT,
        );
        Self {
            state: BattleState::new(11, grid),
            content: ContentRegistry::new(),
            config: GameConfig::default(),
        }
    }

    fn place(&mut self, character: Character, x: i32, y: i32) -> CharacterId {
        self.state
            .place_character(character, Position::new(x, y))
            .unwrap()
    }

    fn engine(&mut self) -> GameEngine<'_> {
        GameEngine::new(&mut self.state, &self.content, &self.config)
    }
}

fn unit(faction: &str, speed: i32) -> Character {
    Character::new("unit", faction, Stats {
        max_hp: 20,
        attack: 5,
        faith: 50,
        movement: 3,
        jump: 2,
        speed,
        ..Stats::default()
    })
}

#[test]
fn faster_character_acts_first() {
    let mut fx = Fixture::new();
    let fast = fx.place(unit("red", 20), 0, 0);
    let slow = fx.place(unit("blue", 10), 5, 5);
    let mut engine = fx.engine();

    assert_eq!(engine.next_turn(), Ok(fast));
    let state = engine.state();
    assert_eq!(state.turn.ticks, 5);
    assert_eq!(state.character(fast).unwrap().ct, 100);
    assert_eq!(state.character(slow).unwrap().ct, 50);
    assert!(state.turn.awaiting_input);
}

#[test]
fn lowest_index_wins_ct_ties() {
    let mut fx = Fixture::new();
    let first = fx.place(unit("red", 10), 0, 0);
    fx.place(unit("blue", 10), 5, 5);
    assert_eq!(fx.engine().next_turn(), Ok(first));
}

#[test]
fn wait_leaves_residual_ct() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine.dispatch(Command::Wait { actor: a }).unwrap();
    let events = engine.take_events();
    assert!(events.contains(&BattleEvent::TurnEnded {
        character: a,
        residual_ct: GameConfig::WAIT_RESIDUAL_CT
    }));
    assert_eq!(engine.state().character(a).unwrap().ct, 20);
    assert_eq!(engine.state().turn.active, None);
}

#[test]
fn commands_outside_the_turn_are_rejected() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    let b = fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();

    assert_eq!(
        engine.validate(&Command::Wait { actor: a }),
        Err(CommandError::NotAwaitingInput)
    );
    engine.next_turn().unwrap();
    assert_eq!(
        engine.validate(&Command::Wait { actor: b }),
        Err(CommandError::NotActive {
            actor: b,
            active: Some(a)
        })
    );
    assert_eq!(
        engine.validate(&Command::Attack { actor: a, target: b }),
        Err(CommandError::OutOfRange(Position::new(5, 5)))
    );
    assert_eq!(
        engine.validate(&Command::Move {
            actor: a,
            destination: Position::new(4, 4)
        }),
        Err(CommandError::NotReachable(Position::new(4, 4)))
    );
    assert_eq!(
        engine.validate(&Command::UseAbility {
            actor: a,
            slot: 0,
            target: AbilityTarget::Character(b)
        }),
        Err(CommandError::NoAbility { slot: 0 })
    );
}

#[test]
fn dead_characters_decay_and_leave_the_map() {
    let mut fx = Fixture::new();
    let mut corpse = unit("red", 10);
    corpse.hp = 0;
    corpse.dead = true;
    let dead = fx.place(corpse, 0, 0);
    let living = fx.place(unit("blue", 5), 5, 5);
    let mut engine = fx.engine();

    let mut decays = Vec::new();
    for _ in 0..50 {
        if engine.state().character(dead).is_none() {
            break;
        }
        let id = engine.next_turn().unwrap();
        if id == living {
            engine.dispatch(Command::Wait { actor: living }).unwrap();
        }
        for event in engine.take_events() {
            if let BattleEvent::Decayed { character, hp } = event {
                assert_eq!(character, dead);
                decays.push(hp);
            }
        }
    }
    assert_eq!(decays, vec![-1, -2, -3, -4]);
    assert!(engine.state().character(dead).is_none());
    assert!(!engine.state().grid.tile(Position::new(0, 0)).unwrap().is_occupied());
}

#[test]
fn poison_hurts_without_staggering() {
    let mut fx = Fixture::new();
    let mut victim = unit("red", 10).with_ct(100);
    victim.status.add(StatusEffectKind::Poison, 3);
    let a = fx.place(victim, 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();

    engine.next_turn().unwrap();
    let character = engine.state().character(a).unwrap();
    assert_eq!(character.hp, 18);
    assert_eq!(character.action, ActionState::Idle);
    assert!(engine.state().turn.awaiting_input);

    engine.dispatch(Command::Wait { actor: a }).unwrap();
    let character = engine.state().character(a).unwrap();
    assert_eq!(character.status.duration(StatusEffectKind::Poison), Some(2));
}

#[test]
fn death_by_poison_ends_the_turn() {
    let mut fx = Fixture::new();
    let mut victim = unit("red", 10).with_ct(100);
    victim.status.add(StatusEffectKind::Poison, 3);
    victim.hp = 2;
    let a = fx.place(victim, 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();

    engine.next_turn().unwrap();
    let character = engine.state().character(a).unwrap();
    assert!(character.dead);
    assert_eq!(character.ct, 0);
    assert_eq!(engine.state().turn.active, None);
    assert!(!engine.state().turn.awaiting_input);
}

#[test]
fn attack_lands_at_hit_time_and_ends_with_the_animation() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    let b = fx.place(unit("blue", 1), 0, 1);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine.dispatch(Command::Attack { actor: a, target: b }).unwrap();
    assert!(engine.is_busy());
    assert_eq!(engine.state().character(a).unwrap().targeted, Some(b));

    engine.update(0.5);
    assert_eq!(engine.state().character(b).unwrap().hp, 20);
    engine.update(0.75);
    assert_eq!(engine.state().character(b).unwrap().hp, 15);
    assert_eq!(engine.state().turn.active, Some(a));

    engine.update(0.25);
    let attacker = engine.state().character(a).unwrap();
    assert!(attacker.action.is_idle());
    assert_eq!(attacker.targeted, None);
    assert_eq!(attacker.ct, 0);
    assert_eq!(engine.state().turn.active, None);
}

#[test]
fn wall_halves_attack_damage() {
    let mut fx = Fixture::new();
    let mut attacker = unit("red", 10).with_ct(100);
    attacker.base_stats.attack = 10;
    let a = fx.place(attacker, 0, 0);
    let mut defender = unit("blue", 1);
    defender.status.add(StatusEffectKind::Wall, 3);
    let b = fx.place(defender, 1, 0);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine.dispatch(Command::Attack { actor: a, target: b }).unwrap();
    engine.update(1.0);
    assert_eq!(engine.state().character(b).unwrap().hp, 15);
}

#[test]
fn movement_walks_one_tile_per_half_second() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine
        .dispatch(Command::Move {
            actor: a,
            destination: Position::new(0, 2),
        })
        .unwrap();
    engine.update(0.5);
    assert_eq!(engine.state().character(a).unwrap().tile, Some(Position::new(0, 1)));
    assert_eq!(engine.state().turn.active, Some(a));

    engine.update(0.5);
    assert_eq!(engine.state().character(a).unwrap().tile, Some(Position::new(0, 2)));
    assert!(engine.state().character(a).unwrap().action.is_idle());
    assert_eq!(engine.state().turn.active, None);
}

#[test]
fn charged_ability_fires_when_ct_refills() {
    let mut fx = Fixture::new();
    let fire = fx
        .content
        .register_ability(AbilityDefinition::new("fire", 8, 25))
        .unwrap();
    let a = fx.place(unit("red", 10).with_ct(100).with_abilities(vec![fire]), 0, 0);
    let b = fx.place(unit("blue", 1), 0, 1);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine
        .dispatch(Command::UseAbility {
            actor: a,
            slot: 0,
            target: AbilityTarget::Character(b),
        })
        .unwrap();
    let caster = engine.state().character(a).unwrap();
    assert!(caster.pending_ability.is_some());
    assert_eq!(caster.ct, 0);
    assert_eq!(engine.state().turn.active, None);

    assert_eq!(engine.next_turn(), Ok(a));
    assert_eq!(engine.state().turn.ticks, 4);
    assert!(matches!(
        engine.state().character(a).unwrap().action,
        ActionState::UsingAbility { .. }
    ));

    engine.update(1.0);
    // faith 50 scales power 8 by 1.125
    assert_eq!(engine.state().character(b).unwrap().hp, 11);
    engine.update(0.5);
    let caster = engine.state().character(a).unwrap();
    assert!(caster.pending_ability.is_none());
    assert!(caster.action.is_idle());
    assert_eq!(engine.state().turn.active, None);
}

#[test]
fn instant_ability_starts_immediately_and_applies_status() {
    let mut fx = Fixture::new();
    let charm = fx
        .content
        .register_ability(AbilityDefinition::new("charm", 0, 100).with_status(StatusEffectKind::Charm, 2))
        .unwrap();
    let a = fx.place(unit("red", 10).with_ct(100).with_abilities(vec![charm]), 0, 0);
    let b = fx.place(unit("blue", 1), 2, 0);
    let mut engine = fx.engine();
    engine.next_turn().unwrap();

    engine
        .dispatch(Command::UseAbility {
            actor: a,
            slot: 0,
            target: AbilityTarget::Tile(Position::new(2, 0)),
        })
        .unwrap();
    assert!(engine.is_busy());
    assert_eq!(engine.state().turn.active, Some(a));

    engine.update(1.5);
    assert!(engine.state().character(b).unwrap().has_status(StatusEffectKind::Charm));
    assert!(engine.take_events().contains(&BattleEvent::StatusApplied {
        character: b,
        kind: StatusEffectKind::Charm,
        duration: 2
    }));
}

#[test]
fn ai_characters_act_without_input() {
    let mut fx = Fixture::new();
    let a = fx.place(
        unit("red", 10)
            .with_ct(100)
            .with_controller(Controller::Ai)
            .with_behaviors(vec![Behavior::Wait, Behavior::Attack]),
        0,
        0,
    );
    let b = fx.place(unit("blue", 1), 1, 0);
    let mut engine = fx.engine();

    engine.next_turn().unwrap();
    assert!(!engine.state().turn.awaiting_input);
    assert!(
        engine
            .take_events()
            .contains(&BattleEvent::CommandDispatched(Command::Attack { actor: a, target: b }))
    );
}

#[test]
fn mind_controlled_character_without_behaviors_waits() {
    let mut fx = Fixture::new();
    let mut confused = unit("red", 10).with_ct(100);
    confused.status.add(StatusEffectKind::Confuse, 1);
    let a = fx.place(confused, 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut engine = fx.engine();

    engine.next_turn().unwrap();
    let character = engine.state().character(a).unwrap();
    assert_eq!(character.ct, GameConfig::WAIT_RESIDUAL_CT);
    assert!(!character.has_status(StatusEffectKind::Confuse));
}

#[test]
fn rejected_replay_command_is_a_protocol_error() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut queue = CommandQueue::replay([Command::Attack {
        actor: a,
        target: CharacterId(9),
    }]);
    let mut engine = fx.engine();

    engine.advance(&mut queue, 0.016).unwrap();
    assert!(engine.state().turn.awaiting_input);
    let error = engine.advance(&mut queue, 0.016).unwrap_err();
    assert!(matches!(
        error,
        EngineError::Protocol(ProtocolError::Rejected {
            source: CommandError::UnknownCharacter(CharacterId(9)),
            ..
        })
    ));
    assert!(queue.history().is_empty());
}

#[test]
fn queued_commands_are_recorded_in_history() {
    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut queue = CommandQueue::default();
    let mut engine = fx.engine();

    engine.advance(&mut queue, 0.016).unwrap();
    queue.push(Command::Wait { actor: a });
    engine.advance(&mut queue, 0.016).unwrap();
    assert_eq!(queue.history(), &[Command::Wait { actor: a }]);
    assert!(queue.is_empty());
}

#[test]
fn engine_errors_carry_their_recovery_severity() {
    use crate::error::{ErrorSeverity, GameError};

    let mut fx = Fixture::new();
    let a = fx.place(unit("red", 10).with_ct(100), 0, 0);
    fx.place(unit("blue", 1), 5, 5);
    let mut queue = CommandQueue::replay([Command::Move {
        actor: a,
        destination: Position::new(-1, 0),
    }]);
    let mut engine = fx.engine();
    engine.advance(&mut queue, 0.016).unwrap();
    let diverged = engine.advance(&mut queue, 0.016).unwrap_err();
    assert_eq!(diverged.severity(), ErrorSeverity::Protocol);
    let EngineError::Protocol(ProtocolError::Rejected { source, .. }) = diverged else {
        panic!("expected a rejected command, got {diverged:?}");
    };
    assert_eq!(source.severity(), ErrorSeverity::Validation);
    assert_eq!(CommandError::Busy.severity(), ErrorSeverity::Recoverable);

    let mut empty = Fixture::new();
    let stalled = empty.engine().advance(&mut CommandQueue::default(), 0.016).unwrap_err();
    assert_eq!(stalled, EngineError::Turn(TurnError::NoCharacters));
    assert_eq!(stalled.severity(), ErrorSeverity::Fatal);
}
