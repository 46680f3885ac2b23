//! Headless tactics client.
//!
//! Composition root: loads content, builds a [`runtime::Runtime`] for the
//! chosen map and seed, and drives it with a scripted or stdin pilot.
//!
//! ```bash
//! # Auto-piloted match on the default map
//! cargo run -p tactics-client -- run --map ford --seed 7
//!
//! # Play back the last recorded match
//! cargo run -p tactics-client -- replay --map ford
//! ```

mod commands;
mod input;
mod logging;
mod summary;

use anyhow::Result;
use clap::Parser;
use commands::{Duel, Inspect, Replay, Run};
use runtime::RuntimeConfig;

/// Tile-based tactical battles
#[derive(Parser)]
#[command(name = "tactics")]
#[command(about = "Run, replay and inspect tactical battles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play a match against the AI
    Run(Run),

    /// Play back a recorded match
    Replay(Replay),

    /// Run a hosted match between two in-process peers
    Duel(Duel),

    /// Show the contents of a replay file
    Inspect(Inspect),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = RuntimeConfig::from_env();

    let _guard = logging::setup_logging()?;

    match cli.command {
        Command::Run(cmd) => cmd.execute(config).await,
        Command::Replay(cmd) => cmd.execute(config).await,
        Command::Duel(cmd) => cmd.execute(config).await,
        Command::Inspect(cmd) => cmd.execute(&config),
    }
}
