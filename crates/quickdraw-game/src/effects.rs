//! Decorative state: particles, muzzle flashes, screen shake and the
//! scrolling background grid. None of this feeds back into scoring, so it
//! draws from `fastrand` rather than the seeded spawner stream.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::target::Target;

const SHOT_SHAKE: f32 = 8.0;
const HIT_SHAKE: f32 = 15.0;
const SHAKE_DECAY: f32 = 0.85;
const SHAKE_FLOOR: f32 = 0.1;
const FLASH_RADIUS: f32 = 35.0;
const FLASH_FADE: f32 = 0.15;
const EXPLOSION_GRAVITY: f32 = 0.15;
const EXPLOSION_FADE: f32 = 0.025;
const POPUP_FADE: f32 = 0.015;
const SHOCKWAVE_GROWTH: f32 = 8.0;
const SHOCKWAVE_FADE: f32 = 0.06;
const GRID_SPACING: f32 = 50.0;
const GRID_SCROLL: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Explosion,
    /// Floating "+N" popup; `combo` is the chain length at the time of the hit.
    Score { points: i32, combo: u32 },
    Shockwave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub life: f32,
    pub color: u32,
    pub radius: f32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Advance one frame. Returns false once the particle has faded out.
    fn update(&mut self) -> bool {
        match self.kind {
            ParticleKind::Shockwave => {
                self.radius += SHOCKWAVE_GROWTH;
                self.life -= SHOCKWAVE_FADE;
            },
            ParticleKind::Explosion => {
                self.x += self.dx;
                self.y += self.dy;
                self.dy += EXPLOSION_GRAVITY;
                self.life -= EXPLOSION_FADE;
            },
            ParticleKind::Score { .. } => {
                self.x += self.dx;
                self.y += self.dy;
                self.life -= POPUP_FADE;
            },
        }
        self.life > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuzzleFlash {
    pub x: f32,
    pub y: f32,
    pub life: f32,
    pub radius: f32,
}

/// Camera shake, kicked by shots and hits and decayed every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ScreenShake {
    pub fn kick(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn update(&mut self) {
        if self.intensity > SHAKE_FLOOR {
            self.offset_x = (fastrand::f32() - 0.5) * self.intensity;
            self.offset_y = (fastrand::f32() - 0.5) * self.intensity;
            self.intensity *= SHAKE_DECAY;
        } else {
            self.intensity = 0.0;
            self.offset_x = 0.0;
            self.offset_y = 0.0;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub flashes: Vec<MuzzleFlash>,
    pub shake: ScreenShake,
    /// Background grid scroll offset in [0, GRID_SPACING).
    pub grid_offset: f32,
}

impl Effects {
    /// Frame step 1: background scroll and shake decay.
    pub fn advance_background(&mut self) {
        self.shake.update();
        self.grid_offset = (self.grid_offset + GRID_SCROLL) % GRID_SPACING;
    }

    pub fn on_shot(&mut self, x: f32, y: f32) {
        self.shake.kick(SHOT_SHAKE);
        self.flashes.push(MuzzleFlash {
            x,
            y,
            life: 1.0,
            radius: FLASH_RADIUS,
        });
    }

    /// Burst, popup and shockwave for a destroyed target.
    pub fn on_hit(&mut self, target: &Target, points: i32, combo: u32) {
        self.shake.kick(HIT_SHAKE);

        let count = 20 + combo as usize * 3;
        self.particles.reserve(count + 2);
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32 + (fastrand::f32() - 0.5) * 0.3;
            let speed = fastrand::f32() * 10.0 + 3.0;
            self.particles.push(Particle {
                x: target.x,
                y: target.y,
                dx: angle.cos() * speed,
                dy: angle.sin() * speed,
                life: 1.0,
                color: target.color,
                radius: fastrand::f32() * 5.0 + 2.0,
                kind: ParticleKind::Explosion,
            });
        }

        self.particles.push(Particle {
            x: target.x,
            y: target.y - 20.0,
            dx: 0.0,
            dy: -2.0,
            life: 1.0,
            color: 0xffffff,
            radius: 0.0,
            kind: ParticleKind::Score { points, combo },
        });
        self.particles.push(Particle {
            x: target.x,
            y: target.y,
            dx: 0.0,
            dy: 0.0,
            life: 1.0,
            color: target.color,
            radius: target.radius,
            kind: ParticleKind::Shockwave,
        });
    }

    /// Frame step 8: move particles and fade flashes, dropping dead ones.
    pub fn update(&mut self) {
        self.particles.retain_mut(Particle::update);
        for flash in &mut self.flashes {
            flash.life -= FLASH_FADE;
        }
        self.flashes.retain(|f| f.life > 0.0);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetKind;

    #[test]
    fn hit_burst_scales_with_combo() {
        let target = Target::fixed(0, TargetKind::Normal, 100.0, 100.0, 30.0);
        let mut fx = Effects::default();
        fx.on_hit(&target, 30, 3);
        let explosions = fx
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Explosion)
            .count();
        assert_eq!(explosions, 29);
        assert_eq!(fx.particles.len(), 31);
        assert_eq!(fx.shake.intensity, HIT_SHAKE);
    }

    #[test]
    fn everything_fades_out() {
        let target = Target::fixed(0, TargetKind::Bonus, 100.0, 100.0, 20.0);
        let mut fx = Effects::default();
        fx.on_shot(100.0, 100.0);
        fx.on_hit(&target, 50, 1);
        for _ in 0..200 {
            fx.advance_background();
            fx.update();
        }
        assert!(fx.particles.is_empty());
        assert!(fx.flashes.is_empty());
        assert_eq!(fx.shake.intensity, 0.0);
    }

    #[test]
    fn flash_lasts_seven_frames() {
        let mut fx = Effects::default();
        fx.on_shot(10.0, 10.0);
        for _ in 0..6 {
            fx.update();
        }
        assert_eq!(fx.flashes.len(), 1);
        fx.update();
        assert!(fx.flashes.is_empty());
    }

    #[test]
    fn grid_wraps() {
        let mut fx = Effects::default();
        for _ in 0..250 {
            fx.advance_background();
        }
        assert!(fx.grid_offset >= 0.0 && fx.grid_offset < GRID_SPACING);
    }
}
