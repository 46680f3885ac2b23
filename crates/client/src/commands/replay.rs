use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use runtime::{FileReplayRepository, ReplayRepository, Runtime, RuntimeConfig};

use super::{ContentArgs, OutputFormat};
use crate::summary::MatchSummary;

/// Play back a recorded match
///
/// Replays store the seed and the players' commands, not the map, so the
/// map has to be the one the match was played on.
#[derive(Args)]
pub struct Replay {
    #[command(flatten)]
    content: ContentArgs,

    /// Replay file (defaults to replay.sav in the save data directory)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Step at the configured tick rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Replay {
    pub async fn execute(self, mut config: RuntimeConfig) -> Result<()> {
        let repository = match self.file {
            Some(path) => FileReplayRepository::new(path),
            None => FileReplayRepository::in_dir(config.replay_dir())?,
        };
        let Some(log) = repository.load()? else {
            bail!("no replay at {}", repository.path().display());
        };

        let loaded = self.content.load(&mut config)?;
        tracing::info!(
            map = self.content.map(),
            seed = log.seed,
            commands = log.commands.len(),
            "playing back replay"
        );
        let mut runtime = Runtime::builder()
            .config(config)
            .content(loaded.registry.clone())
            .battle(loaded.battle(self.content.map(), log.seed)?)
            .replay(log)
            .build()?;

        let outcome = if self.realtime {
            runtime.run().await?
        } else {
            runtime.run_unpaced().await?
        };
        MatchSummary::new(self.content.map(), &runtime, outcome).print(self.format)
    }
}
