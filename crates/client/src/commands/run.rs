use anyhow::Result;
use clap::Args;
use runtime::{FileReplayRepository, Runtime, RuntimeConfig};

use super::{ContentArgs, OutputFormat, fresh_seed};
use crate::input::{AutoPilot, StdinPilot};
use crate::summary::MatchSummary;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Pilot {
    /// Scripted player: close in and attack
    Auto,
    /// Type commands on stdin
    Stdin,
}

/// Play a match against the AI
#[derive(Args)]
pub struct Run {
    #[command(flatten)]
    content: ContentArgs,

    /// Match seed (from the clock when omitted)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Who controls the local player's characters
    #[arg(short, long, value_enum, default_value = "auto")]
    pilot: Pilot,

    /// Step at the configured tick rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Run {
    pub async fn execute(self, mut config: RuntimeConfig) -> Result<()> {
        let loaded = self.content.load(&mut config)?;
        let seed = self.seed.unwrap_or_else(fresh_seed);
        let repository = FileReplayRepository::in_dir(config.replay_dir())?;
        tracing::info!(map = self.content.map(), seed, replay = %repository.path().display(), "starting match");

        let builder = Runtime::builder()
            .config(config)
            .content(loaded.registry.clone())
            .battle(loaded.battle(self.content.map(), seed)?)
            .repository(repository);
        let builder = match self.pilot {
            Pilot::Auto => builder.provider(AutoPilot::default()),
            Pilot::Stdin => builder.provider(StdinPilot::new()),
        };
        let mut runtime = builder.build()?;

        let outcome = if self.realtime {
            runtime.run().await?
        } else {
            runtime.run_unpaced().await?
        };
        MatchSummary::new(self.content.map(), &runtime, outcome).print(self.format)
    }
}
