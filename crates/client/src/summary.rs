//! End-of-match report.

use anyhow::Result;
use serde::Serialize;

use runtime::{MatchOutcome, Runtime};

use crate::commands::OutputFormat;

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub map: String,
    pub seed: u32,
    pub outcome: MatchOutcome,
    pub frames: u64,
    pub ticks: u64,
    pub commands: usize,
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Serialize)]
pub struct CharacterSummary {
    pub id: u8,
    pub name: String,
    pub owner: u8,
    pub hp: i32,
    pub max_hp: i32,
    pub alive: bool,
}

impl MatchSummary {
    pub fn new(map: &str, runtime: &Runtime, outcome: MatchOutcome) -> Self {
        let state = runtime.state();
        Self {
            map: map.to_string(),
            seed: state.seed,
            outcome,
            frames: runtime.frames(),
            ticks: state.turn.ticks,
            commands: runtime.history().len(),
            characters: state
                .characters()
                .iter()
                .map(|character| CharacterSummary {
                    id: character.id.0,
                    name: character.name.clone(),
                    owner: character.owner.0,
                    hp: character.hp,
                    max_hp: character.max_hp(),
                    alive: character.is_alive(),
                })
                .collect(),
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                println!("{} (seed {}): {}", self.map, self.seed, describe(&self.outcome));
                println!(
                    "  {} frames, {} ticks, {} commands",
                    self.frames, self.ticks, self.commands
                );
                for character in &self.characters {
                    let status = if character.alive { "" } else { " (down)" };
                    println!(
                        "  #{} {:<8} p{} {:>3}/{}{status}",
                        character.id, character.name, character.owner, character.hp, character.max_hp
                    );
                }
            }
        }
        Ok(())
    }
}

fn describe(outcome: &MatchOutcome) -> String {
    match outcome {
        MatchOutcome::Victory { .. } => "Victory!".into(),
        MatchOutcome::Defeat { winner } => format!("Defeat. Player {winner} wins."),
        MatchOutcome::Draw => "Draw.".into(),
        MatchOutcome::ReplayOver { winner: Some(winner) } => {
            format!("Replay over. Player {winner} won.")
        }
        MatchOutcome::ReplayOver { winner: None } => "Replay over.".into(),
        MatchOutcome::Abandoned { reason } => format!("Abandoned: {reason}"),
    }
}
