use serde::{Deserialize, Serialize};

use quickdraw_core::mode::GameMode;
use quickdraw_core::records::SessionStats;

use crate::powerups::PowerUpType;
use crate::status::GameStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpStatus {
    pub kind: PowerUpType,
    pub remaining_frames: u32,
}

/// Everything the presentation layer needs to draw one frame of HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub status: GameStatus,
    pub mode: GameMode,
    pub score: u32,
    /// `None` when the mode has no clock.
    pub remaining_secs: Option<u32>,
    pub combo: u32,
    pub streak_banner: bool,
    pub power_ups: Vec<PowerUpStatus>,
    pub difficulty: u32,
    /// Survival only.
    pub lives: Option<u32>,
    /// Aim in arena pixels, once a game has started.
    pub aim: Option<(f32, f32)>,
    pub hand_present: bool,
    /// Seconds left on the pre-game countdown.
    pub countdown: Option<u32>,
    pub live_targets: usize,
    pub stats: SessionStats,
}

impl Default for HudSnapshot {
    fn default() -> Self {
        Self {
            status: GameStatus::Start,
            mode: GameMode::default(),
            score: 0,
            remaining_secs: None,
            combo: 0,
            streak_banner: false,
            power_ups: Vec::new(),
            difficulty: 1,
            lives: None,
            aim: None,
            hand_present: false,
            countdown: None,
            live_targets: 0,
            stats: SessionStats::default(),
        }
    }
}

impl HudSnapshot {
    /// Compact MessagePack encoding for shipping to a renderer.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msgpack_preserves_optional_fields() {
        let hud = HudSnapshot {
            status: GameStatus::Playing,
            mode: GameMode::Survival,
            score: 120,
            lives: Some(2),
            aim: Some((400.0, 300.0)),
            power_ups: vec![PowerUpStatus {
                kind: PowerUpType::SlowMo,
                remaining_frames: 42,
            }],
            ..HudSnapshot::default()
        };
        let bytes = hud.encode().unwrap();
        assert_eq!(HudSnapshot::decode(&bytes).unwrap(), hud);
    }
}
