use std::path::Path;

use serde::Deserialize;

use quickdraw_core::mode::GameMode;
use quickdraw_game::GameConfig;
use quickdraw_gesture::RecognizerConfig;

use crate::error::RuntimeError;

/// Fastest loop rate accepted; above it a tick period rounds toward zero.
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

/// Top-level runtime configuration, loaded from `quickdraw.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frame loop rate (Hz).
    pub frame_rate: f32,
    /// Pose loop rate (Hz).
    pub pose_rate: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Overrides the name remembered in the high-score file when set.
    pub player_name: Option<String>,
    pub mode: GameMode,
    /// Fixed spawner seed; entropy when absent.
    pub seed: Option<u64>,
    /// Wall-clock cap on a demo run (seconds).
    pub demo_secs: u64,
    pub storage: StorageConfig,
    pub leaderboard: LeaderboardConfig,
    /// Without a `[game]` section the standalone game config is used.
    #[serde(default = "GameConfig::load")]
    pub game: GameConfig,
    pub gesture: RecognizerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            pose_rate: 30.0,
            arena_width: 800.0,
            arena_height: 600.0,
            player_name: None,
            mode: GameMode::Arcade,
            seed: None,
            demo_secs: 75,
            storage: StorageConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            game: GameConfig::default(),
            gesture: RecognizerConfig::default(),
        }
    }
}

/// Local high-score file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub high_score_path: String,
    pub high_score_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            high_score_path: "quickdraw-scores.json".to_string(),
            high_score_limit: 10,
        }
    }
}

/// In-memory leaderboard and its live feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Entries per snapshot.
    pub limit: usize,
    pub broadcast_capacity: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            broadcast_capacity: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Read `QUICKDRAW_CONFIG` (or `quickdraw.toml`), falling back to
    /// defaults, then apply environment overrides.
    pub fn load_or_default() -> Self {
        let path = std::env::var("QUICKDRAW_CONFIG").unwrap_or_else(|_| "quickdraw.toml".to_string());
        let mut config = match Self::load(&path) {
            Ok(cfg) => {
                tracing::info!(path = %path, "Loaded configuration");
                cfg
            },
            Err(RuntimeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "No config file found, using defaults");
                Self::with_game_file()
            },
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to load config, using defaults");
                Self::with_game_file()
            },
        };

        if let Ok(name) = std::env::var("QUICKDRAW_PLAYER")
            && !name.is_empty()
        {
            config.player_name = Some(name);
        }
        if let Ok(mode) = std::env::var("QUICKDRAW_MODE")
            && let Ok(mode) = mode.parse::<GameMode>()
        {
            config.mode = mode;
        }
        config
    }

    fn with_game_file() -> Self {
        Self {
            game: GameConfig::load(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        for (name, rate) in [("frame_rate", self.frame_rate), ("pose_rate", self.pose_rate)] {
            if !(rate.is_finite() && rate > 0.0 && rate <= MAX_TICK_RATE_HZ) {
                return Err(RuntimeError::Config(format!(
                    "{name} must be in (0, {MAX_TICK_RATE_HZ}] Hz, got {rate}"
                )));
            }
        }
        if self.storage.high_score_limit == 0 {
            return Err(RuntimeError::Config("storage.high_score_limit must be > 0".to_string()));
        }
        if self.leaderboard.limit == 0 || self.leaderboard.broadcast_capacity == 0 {
            return Err(RuntimeError::Config(
                "leaderboard.limit and leaderboard.broadcast_capacity must be > 0".to_string(),
            ));
        }
        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            tracing::warn!(
                width = self.arena_width,
                height = self.arena_height,
                "Arena is empty; frames will be skipped until it is resized"
            );
        }
        Ok(())
    }
}
