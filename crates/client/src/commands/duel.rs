use anyhow::{Result, bail};
use clap::Args;
use runtime::{
    Connection, LocalNetwork, Runtime, RuntimeConfig, Session, SessionSignal, SessionState,
};

use super::{ContentArgs, OutputFormat, fresh_seed};
use crate::input::AutoPilot;
use crate::summary::MatchSummary;

const HANDSHAKE_ROUNDS: usize = 8;

/// Run a hosted match between two in-process peers
///
/// Both peers are auto-piloted and talk through the same session protocol a
/// remote match uses. Useful to check that they agree on the result.
#[derive(Args)]
pub struct Duel {
    #[command(flatten)]
    content: ContentArgs,

    /// Match seed chosen by the host (from the clock when omitted)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Duel {
    pub async fn execute(self, mut config: RuntimeConfig) -> Result<()> {
        let loaded = self.content.load(&mut config)?;
        let network = LocalNetwork::new(config.max_players);

        let mut host = Session::new(config.max_players);
        host.host(Box::new(network.host()?), self.seed.unwrap_or_else(fresh_seed));
        let mut guest = Session::new(config.max_players);
        guest.begin_join();
        guest.join(network.connect().map(|c| Box::new(c) as Box<dyn Connection>))?;

        let playing = |session: &Session| session.state() == SessionState::Playing;
        for _ in 0..HANDSHAKE_ROUNDS {
            if playing(&host) && playing(&guest) {
                break;
            }
            for signal in host.update().into_iter().chain(guest.update()) {
                if let SessionSignal::MatchReady { seed } = signal {
                    tracing::info!(seed, "peer ready");
                }
            }
        }
        if !playing(&host) || !playing(&guest) {
            bail!("handshake did not complete");
        }

        let mut peers = Vec::with_capacity(2);
        for session in [host, guest] {
            let battle = loaded.battle(self.content.map(), session.seed())?;
            let runtime = Runtime::builder()
                .config(config.clone())
                .content(loaded.registry.clone())
                .battle(battle)
                .session(session)
                .provider(AutoPilot::default())
                .build()?;
            peers.push(runtime);
        }

        let tick = config.tick_seconds();
        let mut outcomes = vec![None; peers.len()];
        while outcomes.iter().any(Option::is_none) {
            for (runtime, outcome) in peers.iter_mut().zip(outcomes.iter_mut()) {
                *outcome = runtime.step(tick).await?;
            }
        }

        for (runtime, outcome) in peers.iter().zip(outcomes) {
            if let Some(outcome) = outcome {
                println!("player {}:", runtime.local_player());
                MatchSummary::new(self.content.map(), runtime, outcome).print(self.format)?;
            }
        }
        Ok(())
    }
}
