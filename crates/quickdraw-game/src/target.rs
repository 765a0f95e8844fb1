use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::powerups::PowerUpType;

/// Phase advance per frame at full speed.
pub const PHASE_STEP: f32 = 0.03;
/// Mean orbit radius around the spawn origin (pixels).
pub const ORBIT_BASE_RADIUS: f32 = 80.0;
/// Orbit radius swing (pixels).
pub const ORBIT_SWING: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Normal,
    Bonus,
    Bomb,
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePattern {
    /// Straight line, bouncing off the walls.
    Linear,
    /// Horizontal drift with a sinusoidal vertical sweep.
    Zigzag,
    /// Breathing circle around the spawn origin.
    Orbit,
    /// Never moves. Only used for scripted placements.
    Static,
}

/// A live target in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Packed 0xRRGGBB.
    pub color: u32,
    pub kind: TargetKind,
    pub pattern: MovePattern,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub phase: f32,
    /// Base points; negative for bombs.
    pub points: i32,
    pub power_up: Option<PowerUpType>,
    /// Frames since spawn.
    pub age: u32,
}

impl Target {
    /// A motionless target at a fixed position.
    pub fn fixed(id: u64, kind: TargetKind, x: f32, y: f32, radius: f32) -> Self {
        let (points, color) = match kind {
            TargetKind::Normal => (10, 0x00f3ff),
            TargetKind::Bonus => (50, 0xffd700),
            TargetKind::Bomb => (-20, 0xff2222),
            TargetKind::PowerUp => (5, 0x00ff88),
        };
        Self {
            id,
            x,
            y,
            radius,
            color,
            kind,
            pattern: MovePattern::Static,
            dx: 0.0,
            dy: 0.0,
            speed: 0.0,
            origin_x: x,
            origin_y: y,
            phase: 0.0,
            points,
            power_up: None,
            age: 0,
        }
    }

    /// Attach a power-up subtype (builder style, for scripted placements).
    pub fn with_power_up(mut self, kind: PowerUpType) -> Self {
        self.power_up = Some(kind);
        self
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move one frame. `speed_factor` scales both displacement and phase.
    pub fn advance(&mut self, arena: &Arena, speed_factor: f32) {
        self.age = self.age.saturating_add(1);
        let phase = self.phase;
        self.phase += PHASE_STEP * speed_factor;

        let (min_x, max_x) = (self.radius, arena.width - self.radius);
        let (min_y, max_y) = (self.radius, arena.height - self.radius);

        match self.pattern {
            MovePattern::Linear => {
                self.x += self.dx * speed_factor;
                self.y += self.dy * speed_factor;
                if self.x < min_x || self.x > max_x {
                    self.dx = -self.dx;
                    self.x = clamp_axis(self.x, min_x, max_x);
                }
                if self.y < min_y || self.y > max_y {
                    self.dy = -self.dy;
                    self.y = clamp_axis(self.y, min_y, max_y);
                }
            },
            MovePattern::Zigzag => {
                self.x += self.dx * speed_factor;
                self.y += (phase * 3.0).sin() * self.speed * 2.0 * speed_factor;
                if self.x < min_x || self.x > max_x {
                    self.dx = -self.dx;
                    self.x = clamp_axis(self.x, min_x, max_x);
                }
                self.y = clamp_axis(self.y, min_y, max_y);
            },
            MovePattern::Orbit => {
                let orbit = ORBIT_BASE_RADIUS + (phase * 0.5).sin() * ORBIT_SWING;
                self.x = clamp_axis(self.origin_x + phase.cos() * orbit, min_x, max_x);
                self.y = clamp_axis(self.origin_y + phase.sin() * orbit, min_y, max_y);
            },
            MovePattern::Static => {},
        }
    }
}

/// Clamp that tolerates an arena narrower than the target.
fn clamp_axis(v: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return (min + max) / 2.0;
    }
    v.clamp(min, max)
}
