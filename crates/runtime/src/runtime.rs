//! Fixed-tick match driver.
//!
//! [`Runtime`] owns one battle: it polls the session, feeds remote and local
//! commands into the queue, steps the engine, publishes events and decides
//! when the match is over.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use game_core::{
    BattleEvent, BattleState, Command, CommandQueue, ContentRegistry, ErrorSeverity, GameConfig,
    GameEngine, GameError, PlayerId, QueueMode, ReplayLog,
};

use crate::api::{InputProvider, Result, RuntimeError, WaitInputProvider};
use crate::events::{Event, EventBus, MatchOutcome, SessionEvent, Topic};
use crate::repository::ReplayRepository;
use crate::session::{Session, SessionSignal};

/// Runtime configuration shared by the driver and the session.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Simulation steps per second.
    pub tick_rate_hz: u32,
    pub event_buffer_size: usize,
    /// Directory holding `replay.sav`; platform data dir when unset.
    pub save_data_dir: Option<PathBuf>,
    pub port: u16,
    pub max_players: u8,
    /// Ends the match as abandoned after this many steps.
    pub max_frames: Option<u64>,
}

impl RuntimeConfig {
    pub const GAME_PORT: u16 = 54321;
    pub const MAX_PLAYERS: u8 = 2;
    pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TICK_RATE_HZ` - Simulation steps per second (default: 60)
    /// - `EVENT_BUFFER_SIZE` - Capacity of each event topic (default: 256)
    /// - `SAVE_DATA_DIR` - Directory for `replay.sav` (default: platform-specific)
    /// - `GAME_PORT` - Port the host listens on (default: 54321)
    /// - `MAX_PLAYERS` - Players per match (default: 2)
    /// - `MAX_FRAMES` - Step limit for headless runs (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rate) = read_env::<u32>("TICK_RATE_HZ") {
            config.tick_rate_hz = rate.max(1);
        }
        if let Some(size) = read_env::<usize>("EVENT_BUFFER_SIZE") {
            config.event_buffer_size = size.max(1);
        }
        config.save_data_dir = std::env::var("SAVE_DATA_DIR").ok().map(PathBuf::from);
        if let Some(port) = read_env::<u16>("GAME_PORT") {
            config.port = port;
        }
        if let Some(players) = read_env::<u8>("MAX_PLAYERS") {
            config.max_players = players.max(2);
        }
        config.max_frames = read_env::<u64>("MAX_FRAMES");

        config
    }

    /// Seconds of simulated time per step.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }

    /// Where replays are written.
    ///
    /// - Linux: `~/.local/share/tactics` (or `$XDG_DATA_HOME/tactics`)
    /// - macOS: `~/Library/Application Support/tactics`
    /// - Fallback: `./save_data`
    pub fn replay_dir(&self) -> PathBuf {
        self.save_data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "tactics")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("./save_data"))
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            event_buffer_size: 256,
            save_data_dir: None,
            port: Self::GAME_PORT,
            max_players: Self::MAX_PLAYERS,
            max_frames: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    std::env::var(key).ok()?.parse().ok()
}

/// Drives one battle to its end.
pub struct Runtime {
    config: RuntimeConfig,
    content: Arc<ContentRegistry>,
    state: BattleState,
    queue: CommandQueue,
    session: Option<Session>,
    local_player: PlayerId,
    provider: Box<dyn InputProvider>,
    repository: Option<Box<dyn ReplayRepository>>,
    bus: EventBus,
    frames: u64,
    outcome: Option<MatchOutcome>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Commands dispatched so far, in dispatch order.
    pub fn history(&self) -> &[Command] {
        self.queue.history()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn local_player(&self) -> PlayerId {
        self.local_player
    }

    pub fn is_replay(&self) -> bool {
        self.queue.mode() == QueueMode::Replay
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// The replay of everything dispatched so far.
    pub fn replay_log(&self) -> ReplayLog {
        ReplayLog::new(self.state.seed, self.queue.history().to_vec())
    }

    /// Runs one simulation step of `delta_seconds`.
    ///
    /// Returns the outcome once the match is over; further calls are no-ops.
    pub async fn step(&mut self, delta_seconds: f32) -> Result<Option<MatchOutcome>> {
        if self.outcome.is_some() {
            return Ok(self.outcome.clone());
        }

        self.poll_session();
        if self.outcome.is_some() {
            return Ok(self.outcome.clone());
        }

        let advanced = GameEngine::new(&mut self.state, &self.content, &self.config.game_config)
            .advance(&mut self.queue, delta_seconds);
        match advanced {
            Ok(events) => {
                self.alert_remote_owners(&events);
                self.bus.publish_battle(events);
            }
            // A peer or replay diverged: end the match, keep the process.
            Err(error) if error.severity() == ErrorSeverity::Protocol => {
                self.abandon(error.to_string());
                return Ok(self.outcome.clone());
            }
            Err(error) => return Err(error.into()),
        }

        self.request_local_input().await?;
        self.frames += 1;
        self.check_match_end()?;

        if self.outcome.is_none()
            && let Some(limit) = self.config.max_frames
            && self.frames >= limit
        {
            self.abandon(format!("frame limit {limit} reached"));
        }

        // A player is up but the recording has nothing left for them.
        if self.outcome.is_none()
            && self.is_replay()
            && self.queue.is_empty()
            && self.state.turn.awaiting_input
        {
            self.end(MatchOutcome::ReplayOver {
                winner: self.state.victor(),
            });
        }
        Ok(self.outcome.clone())
    }

    /// Runs the match in real time at the configured tick rate.
    pub async fn run(&mut self) -> Result<MatchOutcome> {
        let tick = self.config.tick_seconds();
        let mut ticker = tokio::time::interval(Duration::from_secs_f32(tick));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Some(outcome) = self.step(tick).await? {
                return Ok(outcome);
            }
        }
    }

    /// Runs the match as fast as possible with the configured step size.
    pub async fn run_unpaced(&mut self) -> Result<MatchOutcome> {
        let tick = self.config.tick_seconds();
        loop {
            if let Some(outcome) = self.step(tick).await? {
                return Ok(outcome);
            }
            tokio::task::yield_now().await;
        }
    }

    fn poll_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let signals = session.update();
        let events = session.take_events();
        for event in events {
            self.bus.publish_session(event);
        }

        for signal in signals {
            match signal {
                SessionSignal::Command(command) => {
                    tracing::debug!(%command, "remote command queued");
                    self.queue.push(command);
                }
                SessionSignal::TurnAlert(character) => {
                    tracing::debug!(%character, "turn alert");
                }
                SessionSignal::MatchReady { seed } => {
                    tracing::debug!(seed, "session reports match ready");
                }
                SessionSignal::Disconnected => {
                    self.end(MatchOutcome::Abandoned {
                        reason: "connection lost".into(),
                    });
                }
            }
        }
    }

    fn alert_remote_owners(&mut self, events: &[BattleEvent]) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for event in events {
            if let BattleEvent::AwaitingInput { character, owner } = *event
                && owner != self.local_player
                && let Err(error) = session.send_turn_alert(owner, character)
            {
                tracing::warn!(%error, %character, "turn alert not delivered");
            }
        }
    }

    /// Asks the provider for a command when a locally owned character is
    /// waiting and nothing else is queued or playing out.
    async fn request_local_input(&mut self) -> Result<()> {
        if self.is_replay() || !self.queue.is_empty() || !self.state.turn.awaiting_input {
            return Ok(());
        }
        let Some(active) = self.state.turn.active else {
            return Ok(());
        };
        if self
            .state
            .character(active)
            .is_none_or(|character| character.owner != self.local_player)
        {
            return Ok(());
        }
        if GameEngine::new(&mut self.state, &self.content, &self.config.game_config).is_busy() {
            return Ok(());
        }

        let command = self.provider.provide_command(active, &self.state).await?;
        let verdict = GameEngine::new(&mut self.state, &self.content, &self.config.game_config)
            .validate(&command);
        match verdict {
            Ok(()) => {
                tracing::debug!(%command, "local command queued");
                self.queue.push(command);
                if let Some(session) = self.session.as_mut()
                    && let Err(error) = session.send_command(command)
                {
                    tracing::warn!(%error, %command, "command not delivered");
                }
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    %command,
                    severity = error.severity().as_str(),
                    "local command rejected"
                );
                self.bus.publish_session(SessionEvent::CommandRejected {
                    command,
                    reason: error.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_match_end(&mut self) -> Result<()> {
        let owners = self.state.surviving_owners();
        if owners.len() > 1 {
            return Ok(());
        }
        let winner = owners.into_iter().next();

        let outcome = if self.is_replay() {
            MatchOutcome::ReplayOver { winner }
        } else {
            self.save_replay()?;
            match winner {
                None => MatchOutcome::Draw,
                Some(winner) if winner == self.local_player => MatchOutcome::Victory { winner },
                Some(winner) => MatchOutcome::Defeat { winner },
            }
        };
        if let Some(session) = self.session.as_mut() {
            session.finish();
        }
        self.end(outcome);
        Ok(())
    }

    fn save_replay(&mut self) -> Result<()> {
        let Some(repository) = self.repository.as_ref() else {
            return Ok(());
        };
        let replay = self.replay_log();
        repository.save(&replay)?;
        self.bus.publish_session(SessionEvent::ReplaySaved {
            commands: replay.commands.len(),
        });
        Ok(())
    }

    /// Ends the match early; peers are dropped, nothing is saved.
    fn abandon(&mut self, reason: String) {
        if let Some(session) = self.session.as_mut() {
            session.drop_peer(reason.clone());
            for event in session.take_events() {
                self.bus.publish_session(event);
            }
        } else {
            tracing::warn!(%reason, "match abandoned");
        }
        self.end(MatchOutcome::Abandoned { reason });
    }

    fn end(&mut self, outcome: MatchOutcome) {
        tracing::info!(?outcome, frames = self.frames, ticks = self.state.turn.ticks, "match over");
        self.bus
            .publish_session(SessionEvent::MatchEnded(outcome.clone()));
        self.outcome = Some(outcome);
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Arc<ContentRegistry>>,
    state: Option<BattleState>,
    replay: Option<ReplayLog>,
    session: Option<Session>,
    local_player: Option<PlayerId>,
    provider: Option<Box<dyn InputProvider>>,
    repository: Option<Box<dyn ReplayRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            state: None,
            replay: None,
            session: None,
            local_player: None,
            provider: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content(mut self, content: Arc<ContentRegistry>) -> Self {
        self.content = Some(content);
        self
    }

    /// The battle as built from the match seed.
    pub fn battle(mut self, state: BattleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Plays back a recorded match instead of taking input.
    pub fn replay(mut self, replay: ReplayLog) -> Self {
        self.replay = Some(replay);
        self
    }

    /// A session already in the playing state.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Defaults to the session's connection index, or player 0 offline.
    pub fn local_player(mut self, player: PlayerId) -> Self {
        self.local_player = Some(player);
        self
    }

    /// Defaults to [`WaitInputProvider`].
    pub fn provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Where finished live matches write their replay.
    pub fn repository(mut self, repository: impl ReplayRepository + 'static) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    pub fn build(self) -> Result<Runtime> {
        let content = self.content.ok_or(RuntimeError::Missing("content"))?;
        let state = self.state.ok_or(RuntimeError::Missing("battle state"))?;

        let queue = match self.replay {
            Some(replay) if replay.seed != state.seed => {
                return Err(RuntimeError::ReplaySeedMismatch {
                    replay: replay.seed,
                    battle: state.seed,
                });
            }
            Some(replay) => CommandQueue::replay(replay.commands),
            None => CommandQueue::new(QueueMode::Live),
        };

        let local_player = self
            .local_player
            .or_else(|| self.session.as_ref().map(Session::local_player))
            .unwrap_or(PlayerId(0));

        tracing::info!(
            seed = state.seed,
            characters = state.characters().len(),
            mode = ?queue.mode(),
            %local_player,
            "runtime built"
        );

        Ok(Runtime {
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
            content,
            state,
            queue,
            session: self.session,
            local_player,
            provider: self
                .provider
                .unwrap_or_else(|| Box::new(WaitInputProvider)),
            repository: self.repository,
            frames: 0,
            outcome: None,
        })
    }
}
