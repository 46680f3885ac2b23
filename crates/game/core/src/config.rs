/// Rule constants and tunable parameters.
///
/// The associated constants are fixed by the wire/replay contract (changing
/// them changes simulation results). The fields are tunables that both peers
/// must agree on before a match starts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Tiles per second walked by a moving character.
    pub move_tiles_per_second: f32,
    /// Upper bound for a single update step, in seconds.
    pub max_delta_seconds: f32,
    /// Flee utility at zero HP when a behavior does not override it.
    pub default_cowardice: f32,
    /// Baseline utility of approaching an enemy.
    pub close_to_attack_baseline: f32,
    /// Scale applied to the best utility found by approaching.
    pub close_to_attack_scale: f32,
    /// Fixed utility of waiting.
    pub wait_utility: f32,
    /// Tries made when sampling a random free tile.
    pub random_tile_attempts: u32,
    /// Random tiles considered when choosing where to flee.
    pub flee_candidates: u32,
}

impl GameConfig {
    // ===== rule constants =====
    /// CT at which a character becomes ready to act.
    pub const CT_THRESHOLD: i32 = 100;
    /// Residual CT after an explicit wait.
    pub const WAIT_RESIDUAL_CT: i32 = 20;
    /// A dead character is removed once its HP decays to this value.
    pub const DECAY_THRESHOLD_HP: i32 = -4;
    /// Fraction of max HP lost to poison at turn start.
    pub const POISON_FRACTION: f32 = 0.1;
    pub const DEFAULT_TILE_HEIGHT: f32 = 5.0;
    pub const MAX_STATUS_EFFECTS: usize = 8;
    /// Ability power multiplier at faith 0 and faith 100.
    pub const FAITH_POWER_RANGE: (f32, f32) = (0.25, 2.0);

    // ===== tunable defaults =====
    pub const DEFAULT_MOVE_TILES_PER_SECOND: f32 = 2.0;
    pub const DEFAULT_MAX_DELTA_SECONDS: f32 = 0.1;
    pub const DEFAULT_COWARDICE: f32 = 0.7;
    pub const DEFAULT_CLOSE_TO_ATTACK_BASELINE: f32 = 0.5;
    pub const DEFAULT_CLOSE_TO_ATTACK_SCALE: f32 = 0.6;
    pub const DEFAULT_WAIT_UTILITY: f32 = 0.05;
    pub const DEFAULT_RANDOM_TILE_ATTEMPTS: u32 = 1000;
    pub const DEFAULT_FLEE_CANDIDATES: u32 = 10;

    pub fn new() -> Self {
        Self {
            move_tiles_per_second: Self::DEFAULT_MOVE_TILES_PER_SECOND,
            max_delta_seconds: Self::DEFAULT_MAX_DELTA_SECONDS,
            default_cowardice: Self::DEFAULT_COWARDICE,
            close_to_attack_baseline: Self::DEFAULT_CLOSE_TO_ATTACK_BASELINE,
            close_to_attack_scale: Self::DEFAULT_CLOSE_TO_ATTACK_SCALE,
            wait_utility: Self::DEFAULT_WAIT_UTILITY,
            random_tile_attempts: Self::DEFAULT_RANDOM_TILE_ATTEMPTS,
            flee_candidates: Self::DEFAULT_FLEE_CANDIDATES,
        }
    }

    /// Clamps a frame delta to the configured maximum.
    pub fn clamp_delta(&self, delta_seconds: f32) -> f32 {
        delta_seconds.clamp(0.0, self.max_delta_seconds)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
