//! Input providers for locally owned characters.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use game_core::pathfinding::reachable_tiles;
use game_core::{AbilityTarget, BattleState, CharacterId, Command, Position};
use runtime::{InputProvider, RuntimeError};

/// Scripted pilot: attacks an adjacent enemy, otherwise walks toward the
/// nearest one.
///
/// A repeated request with an unchanged answer means the last command was
/// rejected, so the pilot waits instead of proposing it forever.
#[derive(Default)]
pub struct AutoPilot {
    last: Mutex<Option<Command>>,
}

impl AutoPilot {
    fn choose(actor: CharacterId, state: &BattleState) -> Command {
        let wait = Command::Wait { actor };
        let Some(character) = state.character(actor) else {
            return wait;
        };
        let Some(from) = character.tile else {
            return wait;
        };
        let Some(enemy_tile) = state
            .nearest_character_not_of_faction(from, &character.faction)
            .and_then(|enemy| state.character(enemy))
            .and_then(|enemy| enemy.tile.map(|tile| (enemy.id, tile)))
        else {
            return wait;
        };

        let (enemy, tile) = enemy_tile;
        if from.manhattan_distance(tile) <= character.attack_range {
            return Command::Attack { actor, target: enemy };
        }
        reachable_tiles(&state.grid, character, None)
            .into_iter()
            .min_by_key(|candidate| candidate.manhattan_distance(tile))
            .filter(|candidate| candidate.manhattan_distance(tile) < from.manhattan_distance(tile))
            .map_or(wait, |destination| Command::Move { actor, destination })
    }
}

#[async_trait]
impl InputProvider for AutoPilot {
    async fn provide_command(
        &self,
        character: CharacterId,
        state: &BattleState,
    ) -> runtime::Result<Command> {
        let mut command = Self::choose(character, state);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() == Some(&command) {
            command = Command::Wait { actor: character };
        }
        *last = Some(command);
        Ok(command)
    }
}

/// Reads commands for the active character from stdin.
///
/// ```text
/// wait
/// move <x> <y>
/// attack <character>
/// ability <slot> <character>
/// ability <slot> <x> <y>
/// ```
pub struct StdinPilot {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinPilot {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl InputProvider for StdinPilot {
    async fn provide_command(
        &self,
        character: CharacterId,
        state: &BattleState,
    ) -> runtime::Result<Command> {
        print_prompt(character, state);
        let mut lines = self.lines.lock().await;
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|_| RuntimeError::InputChannelClosed)?
                .ok_or(RuntimeError::InputChannelClosed)?;
            match parse_command(character, &line) {
                Ok(command) => return Ok(command),
                Err(message) => println!("  {message}"),
            }
        }
    }
}

fn print_prompt(actor: CharacterId, state: &BattleState) {
    println!();
    for character in state.characters().iter().filter(|c| c.is_alive()) {
        let marker = if character.id == actor { '>' } else { ' ' };
        let tile = character
            .tile
            .map_or_else(|| "-".to_string(), |tile| tile.to_string());
        println!(
            "{marker} {} {:<8} p{} hp {:>3}/{:<3} ct {:>3} at {tile}",
            character.id,
            character.name,
            character.owner,
            character.hp,
            character.max_hp(),
            character.ct,
        );
    }
    print!("{actor}> ");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

/// Parses one line of player input into a command for `actor`.
pub fn parse_command(actor: CharacterId, line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let numbers = |args: &[&str]| -> Result<Vec<i32>, String> {
        args.iter()
            .map(|word| word.parse().map_err(|_| format!("not a number: {word}")))
            .collect()
    };
    let character = |value: i32| {
        u8::try_from(value)
            .map(CharacterId)
            .map_err(|_| format!("no such character: {value}"))
    };

    match words.split_first() {
        Some((&"wait", [])) => Ok(Command::Wait { actor }),
        Some((&"move", args)) => match numbers(args)?.as_slice() {
            &[x, y] => Ok(Command::Move {
                actor,
                destination: Position::new(x, y),
            }),
            _ => Err("usage: move <x> <y>".into()),
        },
        Some((&"attack", args)) => match numbers(args)?.as_slice() {
            &[target] => Ok(Command::Attack {
                actor,
                target: character(target)?,
            }),
            _ => Err("usage: attack <character>".into()),
        },
        Some((&"ability", args)) => {
            let values = numbers(args)?;
            let (slot, target) = match values.as_slice() {
                &[slot, target] => (slot, AbilityTarget::Character(character(target)?)),
                &[slot, x, y] => (slot, AbilityTarget::Tile(Position::new(x, y))),
                _ => return Err("usage: ability <slot> <character> | ability <slot> <x> <y>".into()),
            };
            let slot = u8::try_from(slot).map_err(|_| format!("no such slot: {slot}"))?;
            Ok(Command::UseAbility { actor, slot, target })
        }
        _ => Err("commands: wait, move, attack, ability".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: CharacterId = CharacterId(0);

    #[test]
    fn parses_every_command_form() {
        assert_eq!(parse_command(ME, "wait"), Ok(Command::Wait { actor: ME }));
        assert_eq!(
            parse_command(ME, "  move 3 -1 "),
            Ok(Command::Move {
                actor: ME,
                destination: Position::new(3, -1)
            })
        );
        assert_eq!(
            parse_command(ME, "attack 4"),
            Ok(Command::Attack {
                actor: ME,
                target: CharacterId(4)
            })
        );
        assert_eq!(
            parse_command(ME, "ability 1 2"),
            Ok(Command::UseAbility {
                actor: ME,
                slot: 1,
                target: AbilityTarget::Character(CharacterId(2))
            })
        );
        assert_eq!(
            parse_command(ME, "ability 0 5 6"),
            Ok(Command::UseAbility {
                actor: ME,
                slot: 0,
                target: AbilityTarget::Tile(Position::new(5, 6))
            })
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_command(ME, "").is_err());
        assert!(parse_command(ME, "move 1").is_err());
        assert!(parse_command(ME, "attack x").is_err());
        assert!(parse_command(ME, "attack 300").is_err());
        assert!(parse_command(ME, "ability -1 2").is_err());
        assert!(parse_command(ME, "wait now").is_err());
    }
}
