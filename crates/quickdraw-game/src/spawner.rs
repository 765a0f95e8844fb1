use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::Arena;
use crate::powerups::PowerUpType;
use crate::target::{MovePattern, Target, TargetKind};

const NORMAL_PALETTE: [u32; 5] = [0x00f3ff, 0xa855f6, 0x22d3ee, 0x3b82f6, 0x8b5cf6];

/// Map a uniform roll in [0, 1) to a target kind.
pub fn kind_for_roll(roll: f32) -> TargetKind {
    if roll < 0.08 {
        TargetKind::Bomb
    } else if roll < 0.15 {
        TargetKind::Bonus
    } else if roll < 0.18 {
        TargetKind::PowerUp
    } else {
        TargetKind::Normal
    }
}

/// Map a uniform roll in [0, 1) to a movement pattern. Harder patterns
/// unlock with difficulty.
pub fn pattern_for_roll(roll: f32, difficulty: u32) -> MovePattern {
    if difficulty >= 3 && roll < 0.15 {
        MovePattern::Orbit
    } else if difficulty >= 2 && roll < 0.30 {
        MovePattern::Zigzag
    } else {
        MovePattern::Linear
    }
}

pub fn speed_multiplier(difficulty: u32) -> f32 {
    1.0 + difficulty.saturating_sub(1) as f32 * 0.2
}

pub fn size_reduction(difficulty: u32) -> f32 {
    (difficulty.saturating_mul(2)).min(15) as f32
}

/// Procedural target generator. Seed it for reproducible waves.
#[derive(Debug, Clone)]
pub struct TargetSpawner {
    rng: StdRng,
    next_id: u64,
    padding: f32,
}

impl TargetSpawner {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            next_id: 0,
            padding: 20.0,
        }
    }

    /// Gap between a spawned target's edge and the arena wall.
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Hand out an id for a scripted placement.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one target inside `arena`, scaled to `difficulty`.
    pub fn spawn(&mut self, arena: &Arena, difficulty: u32) -> Target {
        let id = self.next_id();
        let kind = kind_for_roll(self.rng.random::<f32>());
        let pattern = pattern_for_roll(self.rng.random::<f32>(), difficulty);
        let speed_mult = speed_multiplier(difficulty);

        let (radius, color, points, base_speed, power_up) = match kind {
            TargetKind::Normal => {
                let radius = self.rng.random_range(0.0..15.0) + 35.0 - size_reduction(difficulty);
                let color = NORMAL_PALETTE[self.rng.random_range(0..NORMAL_PALETTE.len())];
                (radius, color, 10, self.rng.random_range(0.0..2.0) + 1.0, None)
            },
            TargetKind::Bonus => {
                let radius = self.rng.random_range(0.0..8.0) + 18.0;
                (radius, 0xffd700, 50, self.rng.random_range(0.0..3.0) + 2.0, None)
            },
            TargetKind::Bomb => {
                let radius = self.rng.random_range(0.0..12.0) + 30.0;
                (radius, 0xff2222, -20, self.rng.random_range(0.0..1.5) + 0.5, None)
            },
            TargetKind::PowerUp => {
                let sub = PowerUpType::ALL[self.rng.random_range(0..PowerUpType::ALL.len())];
                (22.0, 0x00ff88, 5, self.rng.random_range(0.0..1.0) + 1.0, Some(sub))
            },
        };
        let speed = base_speed * speed_mult;

        let margin = radius + self.padding;
        let x = self.place(arena.width, margin);
        let y = self.place(arena.height, margin);
        let angle = self.rng.random_range(0.0..TAU);
        let phase = self.rng.random_range(0.0..TAU);

        Target {
            id,
            x,
            y,
            radius,
            color,
            kind,
            pattern,
            dx: angle.cos() * speed,
            dy: angle.sin() * speed,
            speed,
            origin_x: x,
            origin_y: y,
            phase,
            points,
            power_up,
            age: 0,
        }
    }

    pub fn spawn_wave(&mut self, count: usize, arena: &Arena, difficulty: u32) -> Vec<Target> {
        (0..count).map(|_| self.spawn(arena, difficulty)).collect()
    }

    fn place(&mut self, extent: f32, margin: f32) -> f32 {
        let span = extent - margin * 2.0;
        if span <= 0.0 {
            return extent / 2.0;
        }
        self.rng.random::<f32>() * span + margin
    }
}
