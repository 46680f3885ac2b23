use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use game_core::WireCommand;
use runtime::{FileReplayRepository, ReplayRepository, RuntimeConfig};

use super::OutputFormat;

/// Show the contents of a replay file
#[derive(Args)]
pub struct Inspect {
    /// Replay file (defaults to replay.sav in the save data directory)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Limit number of commands to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,

    /// Skip first N commands
    #[arg(long, default_value = "0")]
    skip: usize,
}

impl Inspect {
    pub fn execute(self, config: &RuntimeConfig) -> Result<()> {
        let repository = match self.file {
            Some(path) => FileReplayRepository::new(path),
            None => FileReplayRepository::in_dir(config.replay_dir())?,
        };
        let Some(log) = repository.load()? else {
            bail!("no replay at {}", repository.path().display());
        };

        let limit = if self.limit == 0 { usize::MAX } else { self.limit };
        let shown = log.commands.iter().skip(self.skip).take(limit);

        match self.format {
            OutputFormat::Json => {
                let document = serde_json::json!({
                    "file": repository.path(),
                    "seed": log.seed,
                    "total": log.commands.len(),
                    "commands": shown.collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
            OutputFormat::Text => {
                println!("{}", repository.path().display());
                println!(
                    "  seed {}, {} commands ({} bytes each)",
                    log.seed,
                    log.commands.len(),
                    WireCommand::ENCODED_LEN
                );
                for (index, command) in shown.enumerate() {
                    println!("  {:>5}  {command}", index + self.skip);
                }
            }
        }
        Ok(())
    }
}
