use serde::{Deserialize, Serialize};

use quickdraw_core::powerup::{ActivePowerUps, PowerUpKind};

/// Frames every power-up lasts once collected (5 s at 60 Hz).
pub const POWERUP_DURATION_FRAMES: u32 = 300;

/// Power-ups a PowerUp target can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpType {
    /// Targets move at a fraction of their speed.
    SlowMo,
    /// Shots gain a blast radius and can hit several targets.
    MultiShot,
    /// Arcade clock stops and gains bonus seconds.
    TimeFreeze,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 3] = [Self::SlowMo, Self::MultiShot, Self::TimeFreeze];
}

impl PowerUpKind for PowerUpType {
    fn duration_frames(&self) -> u32 {
        match self {
            Self::SlowMo | Self::MultiShot | Self::TimeFreeze => POWERUP_DURATION_FRAMES,
        }
    }
}

pub type GamePowerUps = ActivePowerUps<PowerUpType>;
