use std::time::Duration;

use serde::{Deserialize, Serialize};

use quickdraw_core::audio::{AudioCue, AudioCueQueue};
use quickdraw_core::mode::GameMode;
use quickdraw_core::records::SessionStats;
use quickdraw_gesture::GestureRead;

use crate::arena::Arena;
use crate::collision::resolve_hits;
use crate::config::GameConfig;
use crate::effects::Effects;
use crate::powerups::{GamePowerUps, PowerUpType};
use crate::scoring::{apply_delta, hit_points, is_streak};
use crate::spawner::TargetSpawner;
use crate::target::{Target, TargetKind};

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TimeUp,
    OutOfLives,
    Quit,
}

/// Things that happened during a frame (or a touch shot), for the session
/// and presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Shot { x: f32, y: f32, hits: u32 },
    TargetHit { id: u64, kind: TargetKind, delta: i32 },
    PowerUpCollected(PowerUpType),
    ComboBroken,
    Streak(u32),
    DifficultyUp(u32),
    LifeLost { remaining: u32 },
    Finished(EndReason),
}

/// Per-frame input: wall-clock time since the session started and the
/// latest gesture read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub now: Duration,
    pub gesture: GestureRead,
}

/// Mutable game state for one session. Recreated on every countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub mode: GameMode,
    pub score: u32,
    pub combo: u32,
    pub combo_timer: u32,
    pub streak_timer: u32,
    pub powerups: GamePowerUps,
    pub difficulty: u32,
    pub difficulty_timer: u32,
    /// Survival only.
    pub lives: Option<u32>,
    pub stats: SessionStats,
    /// `None` means the mode has no clock.
    pub remaining_secs: Option<u32>,
    pub targets: Vec<Target>,
    /// Aim in arena pixels.
    pub aim_x: f32,
    pub aim_y: f32,
    pub hand_present: bool,
    pub hand_lost_frames: u32,
    pub spawn_timer: u32,
    pub second_mark: Option<Duration>,
    pub frame: u64,
    pub finished: Option<EndReason>,
}

impl SimulationState {
    pub fn new(mode: GameMode, config: &GameConfig, arena: &Arena) -> Self {
        Self {
            mode,
            score: 0,
            combo: 0,
            combo_timer: 0,
            streak_timer: 0,
            powerups: GamePowerUps::default(),
            difficulty: 1,
            difficulty_timer: 0,
            lives: (mode == GameMode::Survival).then_some(config.survival_lives),
            stats: SessionStats::default(),
            remaining_secs: mode.is_timed().then_some(config.arcade_duration_secs),
            targets: Vec::new(),
            aim_x: arena.width / 2.0,
            aim_y: arena.height / 2.0,
            hand_present: false,
            hand_lost_frames: 0,
            spawn_timer: 0,
            second_mark: None,
            frame: 0,
            finished: None,
        }
    }
}

/// The per-frame orchestrator.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    arena: Arena,
    spawner: TargetSpawner,
    state: SimulationState,
    effects: Effects,
    audio: AudioCueQueue,
    events: Vec<SimEvent>,
    seeded: bool,
}

impl Simulation {
    pub fn new(mode: GameMode, config: GameConfig, arena: Arena, spawner: TargetSpawner) -> Self {
        let state = SimulationState::new(mode, &config, &arena);
        let mut sim = Self {
            config,
            arena,
            spawner,
            state,
            effects: Effects::default(),
            audio: AudioCueQueue::default(),
            events: Vec::new(),
            seeded: false,
        };
        sim.seed_targets();
        sim
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access for scripted scenarios and tooling.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn audio_mut(&mut self) -> &mut AudioCueQueue {
        &mut self.audio
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished.is_some()
    }

    pub fn resize(&mut self, arena: Arena) {
        self.arena = arena;
    }

    /// Forget the last second mark so time spent outside Playing is not
    /// charged to the clock.
    pub fn resync_clock(&mut self) {
        self.state.second_mark = None;
    }

    pub fn clear_targets(&mut self) {
        self.state.targets.clear();
    }

    /// Place a motionless target and return its id.
    pub fn place_target(&mut self, kind: TargetKind, x: f32, y: f32, radius: f32) -> u64 {
        let id = self.spawner.next_id();
        self.state.targets.push(Target::fixed(id, kind, x, y, radius));
        id
    }

    /// Place a motionless power-up target and return its id.
    pub fn place_power_up(&mut self, kind: PowerUpType, x: f32, y: f32) -> u64 {
        let id = self.spawner.next_id();
        self.state
            .targets
            .push(Target::fixed(id, TargetKind::PowerUp, x, y, 22.0).with_power_up(kind));
        id
    }

    /// Events produced outside `update` (touch shots) since the last drain.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// End the session early. Returns false if it had already ended.
    pub fn finish(&mut self, reason: EndReason) -> bool {
        if self.state.finished.is_some() {
            return false;
        }
        self.state.finished = Some(reason);
        self.events.push(SimEvent::Finished(reason));
        tracing::info!(
            mode = %self.state.mode,
            score = self.state.score,
            reason = ?reason,
            "Session finished"
        );
        true
    }

    /// Run one frame.
    pub fn update(&mut self, input: &FrameInput) -> Vec<SimEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        if !self.arena.is_usable() {
            tracing::trace!(width = self.arena.width, height = self.arena.height, "Arena unusable, skipping frame");
            return Vec::new();
        }
        if !self.seeded {
            self.seed_targets();
        }
        self.state.frame += 1;

        self.effects.advance_background();
        self.apply_gesture(&input.gesture);
        self.decay_timers();
        self.state.powerups.tick();
        self.escalate();
        if self.state.mode == GameMode::Survival {
            self.grow_population();
        }
        self.advance_targets();
        self.effects.update();
        self.advance_clock(input.now);
        self.check_finished();

        self.take_events()
    }

    /// Shared fire path for gesture and touch shots. Returns the number of
    /// targets destroyed.
    pub fn fire(&mut self, x: f32, y: f32) -> usize {
        self.state.stats.shots_fired += 1;
        self.audio.push(AudioCue::Shoot);
        self.effects.on_shot(x, y);

        let blast = if self.state.powerups.is_active(PowerUpType::MultiShot) {
            self.config.multishot_blast_radius
        } else {
            0.0
        };
        let hits = resolve_hits(x, y, blast, &self.state.targets);

        if hits.is_empty() {
            self.state.stats.targets_missed += 1;
            self.break_combo();
        } else {
            for &i in &hits {
                let target = self.state.targets[i].clone();
                self.apply_hit(&target);
            }
            // Indices ascend, so popping from the back never disturbs a pending hit.
            for &i in hits.iter().rev() {
                self.state.targets.swap_remove(i);
            }
            if self.state.mode.replaces_targets() {
                for _ in 0..hits.len() {
                    let t = self.spawner.spawn(&self.arena, self.state.difficulty);
                    self.state.targets.push(t);
                }
            }
        }

        self.events.push(SimEvent::Shot {
            x,
            y,
            hits: hits.len() as u32,
        });
        hits.len()
    }

    fn seed_targets(&mut self) {
        if !self.arena.is_usable() {
            return;
        }
        let count = match self.state.mode {
            GameMode::Survival => self.config.survival_initial_targets,
            GameMode::Arcade | GameMode::FreePlay => self.config.initial_targets,
        };
        let wave = self.spawner.spawn_wave(count, &self.arena, self.state.difficulty);
        self.state.targets.extend(wave);
        self.seeded = true;
    }

    fn apply_gesture(&mut self, gesture: &GestureRead) {
        match gesture.snapshot {
            Some(snap) if snap.hand_present => {
                self.state.hand_present = true;
                self.state.hand_lost_frames = 0;
                let (x, y) = self.arena.to_pixels(snap.aim_x, snap.aim_y);
                self.state.aim_x = x;
                self.state.aim_y = y;
                for _ in 0..gesture.fires {
                    self.fire(x, y);
                }
            },
            _ => {
                self.state.hand_present = false;
                self.state.hand_lost_frames = self.state.hand_lost_frames.saturating_add(1);
            },
        }
    }

    fn apply_hit(&mut self, target: &Target) {
        let st = &mut self.state;
        match target.kind {
            TargetKind::Normal | TargetKind::Bonus => {
                let points = hit_points(target.points, st.combo, self.config.max_combo_multiplier);
                st.score = apply_delta(st.score, points);
                st.combo += 1;
                st.combo_timer = self.config.combo_window_frames;
                st.stats.best_combo = st.stats.best_combo.max(st.combo);
                st.stats.targets_hit += 1;
                if target.kind == TargetKind::Bonus {
                    st.stats.bonus_hit += 1;
                }
                self.audio.push(AudioCue::Hit);
                if is_streak(st.combo, self.config.streak_every) {
                    st.streak_timer = self.config.streak_banner_frames;
                    self.audio.push(AudioCue::Streak);
                    self.events.push(SimEvent::Streak(st.combo));
                }
                self.effects.on_hit(target, points, st.combo);
                self.events.push(SimEvent::TargetHit {
                    id: target.id,
                    kind: target.kind,
                    delta: points,
                });
            },
            TargetKind::Bomb => {
                st.score = apply_delta(st.score, target.points);
                st.stats.bombs_hit += 1;
                self.audio.push(AudioCue::Bomb);
                self.effects.on_hit(target, target.points, 0);
                self.events.push(SimEvent::TargetHit {
                    id: target.id,
                    kind: target.kind,
                    delta: target.points,
                });
                self.break_combo();
            },
            TargetKind::PowerUp => {
                st.score = apply_delta(st.score, target.points);
                st.stats.power_ups_collected += 1;
                self.audio.push(AudioCue::PowerUp);
                if let Some(kind) = target.power_up {
                    st.powerups.activate(kind);
                    if kind == PowerUpType::TimeFreeze
                        && let Some(remaining) = st.remaining_secs.as_mut()
                    {
                        *remaining = remaining.saturating_add(self.config.time_freeze_bonus_secs);
                    }
                    self.events.push(SimEvent::PowerUpCollected(kind));
                }
                self.effects.on_hit(target, target.points, st.combo);
                self.events.push(SimEvent::TargetHit {
                    id: target.id,
                    kind: target.kind,
                    delta: target.points,
                });
            },
        }
    }

    fn break_combo(&mut self) {
        if self.state.combo > 0 {
            self.events.push(SimEvent::ComboBroken);
        }
        self.state.combo = 0;
        self.state.combo_timer = 0;
    }

    fn decay_timers(&mut self) {
        if self.state.combo_timer > 0 {
            self.state.combo_timer -= 1;
            if self.state.combo_timer == 0 {
                self.break_combo();
            }
        }
        self.state.streak_timer = self.state.streak_timer.saturating_sub(1);
    }

    fn escalate(&mut self) {
        let interval = self.config.difficulty_interval_frames;
        if interval == 0 {
            return;
        }
        self.state.difficulty_timer += 1;
        if self.state.difficulty_timer >= interval {
            self.state.difficulty_timer = 0;
            if self.state.difficulty < self.config.max_difficulty {
                self.state.difficulty += 1;
                self.events.push(SimEvent::DifficultyUp(self.state.difficulty));
                tracing::debug!(difficulty = self.state.difficulty, "Difficulty increased");
            }
        }
    }

    fn grow_population(&mut self) {
        self.state.spawn_timer += 1;
        if self.state.spawn_timer >= self.config.survival_spawn_interval_frames {
            self.state.spawn_timer = 0;
            if self.state.targets.len() < self.config.survival_cap(self.state.difficulty) {
                let t = self.spawner.spawn(&self.arena, self.state.difficulty);
                self.state.targets.push(t);
            }
        }

        let ceiling = self.config.survival_hard_ceiling;
        if self.state.targets.len() > ceiling {
            let remaining = self.state.lives.map_or(0, |l| l.saturating_sub(1));
            self.state.lives = Some(remaining);
            self.audio.push(AudioCue::Bomb);
            self.events.push(SimEvent::LifeLost { remaining });
            tracing::debug!(remaining, population = self.state.targets.len(), "Overrun, life lost");
            while self.state.targets.len() > ceiling {
                let oldest = self
                    .state
                    .targets
                    .iter()
                    .enumerate()
                    .max_by_key(|(i, t)| (t.age, std::cmp::Reverse(*i)))
                    .map(|(i, _)| i);
                match oldest {
                    Some(i) => {
                        self.state.targets.swap_remove(i);
                    },
                    None => break,
                }
            }
        }
    }

    fn advance_targets(&mut self) {
        let factor = if self.state.powerups.is_active(PowerUpType::SlowMo) {
            self.config.slow_mo_factor
        } else {
            1.0
        };
        for t in &mut self.state.targets {
            t.advance(&self.arena, factor);
        }
    }

    fn advance_clock(&mut self, now: Duration) {
        let Some(mark) = self.state.second_mark else {
            self.state.second_mark = Some(now);
            return;
        };
        if now.saturating_sub(mark) < ONE_SECOND {
            return;
        }
        let mut next = mark + ONE_SECOND;
        if now.saturating_sub(next) >= ONE_SECOND {
            // Stalled for more than a second; resync instead of catching up.
            next = now;
        }
        self.state.second_mark = Some(next);

        if self.state.powerups.is_active(PowerUpType::TimeFreeze) {
            return;
        }
        if let Some(remaining) = self.state.remaining_secs.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    fn check_finished(&mut self) {
        if self.state.remaining_secs == Some(0) {
            self.finish(EndReason::TimeUp);
        } else if self.state.lives == Some(0) {
            self.finish(EndReason::OutOfLives);
        }
    }
}
