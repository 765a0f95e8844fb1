use std::path::Path;

use serde::{Deserialize, Serialize};

/// Data-driven configuration for the simulation and session flow.
/// Durations suffixed `_frames` are counted in simulation steps, so they
/// scale with whatever rate the host drives the frame loop at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Clock length of an arcade session (seconds).
    pub arcade_duration_secs: u32,
    /// Live targets kept on screen in arcade and free-play.
    pub initial_targets: usize,
    /// Targets spawned at the start of a survival session.
    pub survival_initial_targets: usize,
    /// Frames a combo survives without another hit.
    pub combo_window_frames: u32,
    /// Cap on the combo score multiplier.
    pub max_combo_multiplier: u32,
    /// A streak cue plays whenever the combo reaches a multiple of this.
    pub streak_every: u32,
    /// Frames the streak banner stays up.
    pub streak_banner_frames: u32,
    /// Seconds added to the clock by a TimeFreeze pickup.
    pub time_freeze_bonus_secs: u32,
    /// Target speed multiplier while SlowMo is active.
    pub slow_mo_factor: f32,
    /// Extra hit radius while MultiShot is active (pixels).
    pub multishot_blast_radius: f32,
    /// Frames between difficulty steps.
    pub difficulty_interval_frames: u32,
    /// Highest difficulty level.
    pub max_difficulty: u32,
    /// Lives at the start of a survival session.
    pub survival_lives: u32,
    /// Frames between survival spawns.
    pub survival_spawn_interval_frames: u32,
    /// Survival spawn cap at difficulty 0.
    pub survival_base_cap: usize,
    /// Survival spawn cap growth per difficulty level.
    pub survival_cap_per_level: usize,
    /// Survival population above this costs a life.
    pub survival_hard_ceiling: usize,
    /// Consecutive hand-less frames before the session pauses itself.
    pub hand_lost_pause_frames: u32,
    /// Whether prolonged hand loss pauses (and hand return resumes).
    pub auto_pause: bool,
    /// Length of the pre-game countdown (seconds).
    pub countdown_secs: u32,
    /// Gap kept between a freshly spawned target and the arena edge (pixels).
    pub spawn_padding: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arcade_duration_secs: 60,
            initial_targets: 5,
            survival_initial_targets: 3,
            combo_window_frames: 120,
            max_combo_multiplier: 5,
            streak_every: 5,
            streak_banner_frames: 90,
            time_freeze_bonus_secs: 10,
            slow_mo_factor: 0.3,
            multishot_blast_radius: 60.0,
            difficulty_interval_frames: 600,
            max_difficulty: 10,
            survival_lives: 3,
            survival_spawn_interval_frames: 90,
            survival_base_cap: 5,
            survival_cap_per_level: 2,
            survival_hard_ceiling: 15,
            hand_lost_pause_frames: 90,
            auto_pause: true,
            countdown_secs: 3,
            spawn_padding: 20.0,
        }
    }
}

impl GameConfig {
    /// Load config from `QUICKDRAW_GAME_CONFIG` or `config/game.toml`,
    /// falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("QUICKDRAW_GAME_CONFIG")
            && let Some(config) = Self::load_from(&path)
        {
            return config;
        }
        Self::load_from("config/game.toml").unwrap_or_default()
    }

    /// Parse a TOML file. `None` when it is missing or malformed; the latter
    /// is logged.
    pub fn load_from(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded game config");
                Some(config)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed game config");
                None
            },
        }
    }

    /// Survival spawn cap at the given difficulty.
    pub fn survival_cap(&self, difficulty: u32) -> usize {
        self.survival_base_cap + difficulty as usize * self.survival_cap_per_level
    }
}
