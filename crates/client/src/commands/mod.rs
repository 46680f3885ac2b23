//! Subcommands.

mod duel;
mod inspect;
mod replay;
mod run;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use game_content::ContentFactory;
use game_core::{BattleState, ContentRegistry};

pub use duel::Duel;
pub use inspect::Inspect;
pub use replay::Replay;
pub use run::Run;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Where battle content comes from.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Directory with tiles.ron, abilities.ron, characters.ron, maps.ron
    /// and config.toml
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Map to build
    #[arg(short, long, default_value = "ford")]
    map: String,
}

/// Content and rules loaded for one match.
pub struct Loaded {
    pub factory: ContentFactory,
    pub registry: Arc<ContentRegistry>,
}

impl ContentArgs {
    pub fn map(&self) -> &str {
        &self.map
    }

    /// Loads the registry and lets `config.toml` override the rule
    /// tunables in `config`.
    pub fn load(&self, config: &mut runtime::RuntimeConfig) -> Result<Loaded> {
        let factory = ContentFactory::new(&self.data_dir);
        config.game_config = factory
            .load_config()
            .with_context(|| format!("loading config from {}", self.data_dir.display()))?;
        let registry = factory
            .load_registry()
            .with_context(|| format!("loading content from {}", self.data_dir.display()))?;
        Ok(Loaded {
            factory,
            registry: Arc::new(registry),
        })
    }
}

impl Loaded {
    pub fn battle(&self, map: &str, seed: u32) -> Result<BattleState> {
        self.factory.build_battle(&self.registry, map, seed)
    }
}

/// A seed from the wall clock, for matches started without one.
pub fn fresh_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() ^ elapsed.as_secs() as u32)
        .unwrap_or(1)
}
