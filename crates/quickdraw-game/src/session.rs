use std::time::Duration;

use serde::{Deserialize, Serialize};

use quickdraw_core::audio::{AudioCue, AudioCueQueue, AudioSink, SilentAudio};
use quickdraw_core::mode::GameMode;
use quickdraw_core::records::{DiscardScores, HighScoreEntry, HighScoreSink, ScoreRecord, ScoreSubmitter, SessionStats};
use quickdraw_gesture::GestureRead;

use crate::arena::Arena;
use crate::config::GameConfig;
use crate::engine::{EndReason, FrameInput, SimEvent, Simulation};
use crate::hud::{HudSnapshot, PowerUpStatus};
use crate::spawner::TargetSpawner;
use crate::status::{GameStatus, StatusMachine, TransitionError};

const DEFAULT_PLAYER: &str = "Anonymous";

/// External collaborators a session talks to. All of them are
/// fire-and-forget from the session's point of view.
pub struct Collaborators {
    pub audio: Box<dyn AudioSink>,
    pub high_scores: Box<dyn HighScoreSink>,
    pub submitter: Box<dyn ScoreSubmitter>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            audio: Box::new(SilentAudio),
            high_scores: Box::new(DiscardScores),
            submitter: Box::new(DiscardScores),
        }
    }
}

/// Final numbers of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub player: String,
    pub mode: GameMode,
    pub score: u32,
    pub stats: SessionStats,
    pub reason: EndReason,
}

#[derive(Debug, Default)]
struct Countdown {
    started_at: Option<Duration>,
    announced: u32,
    value: u32,
}

/// One player's game context: status machine, the running simulation and
/// the collaborators results are handed to.
pub struct Session {
    config: GameConfig,
    status: StatusMachine,
    mode: GameMode,
    player_name: String,
    arena: Arena,
    seed: Option<u64>,
    games_started: u64,
    sim: Option<Simulation>,
    countdown: Countdown,
    auto_paused: bool,
    finalized: bool,
    last_result: Option<SessionResult>,
    hand_present: bool,
    cues: AudioCueQueue,
    collaborators: Collaborators,
}

impl Session {
    pub fn new(config: GameConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            status: StatusMachine::new(),
            mode: GameMode::default(),
            player_name: DEFAULT_PLAYER.to_string(),
            arena: Arena::default(),
            seed: None,
            games_started: 0,
            sim: None,
            countdown: Countdown::default(),
            auto_paused: false,
            finalized: false,
            last_result: None,
            hand_present: false,
            cues: AudioCueQueue::default(),
            collaborators,
        }
    }

    /// Make target waves reproducible. Each game still gets its own stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_arena(mut self, arena: Arena) -> Self {
        self.arena = arena;
        self
    }

    pub fn status(&self) -> GameStatus {
        self.status.current()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.sim.as_mut()
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn is_auto_paused(&self) -> bool {
        self.auto_paused
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: &str) {
        let name = name.trim();
        self.player_name = if name.is_empty() {
            DEFAULT_PLAYER.to_string()
        } else {
            name.to_string()
        };
    }

    /// Start -> Countdown in `mode`.
    pub fn start(&mut self, mode: GameMode) -> Result<(), TransitionError> {
        self.status.transition(GameStatus::Countdown)?;
        self.mode = mode;
        self.enter_countdown();
        Ok(())
    }

    /// GameOver -> Countdown in the same mode.
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        if self.status() != GameStatus::GameOver {
            return Err(TransitionError {
                from: self.status(),
                to: GameStatus::Countdown,
            });
        }
        self.status.transition(GameStatus::Countdown)?;
        self.enter_countdown();
        Ok(())
    }

    /// GameOver -> Start.
    pub fn main_menu(&mut self) -> Result<(), TransitionError> {
        self.status.transition(GameStatus::Start)?;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.status.transition(GameStatus::Paused)?;
        self.auto_paused = false;
        tracing::info!("Paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.status.transition(GameStatus::Playing)?;
        self.auto_paused = false;
        if let Some(sim) = self.sim.as_mut() {
            sim.resync_clock();
        }
        tracing::info!("Resumed");
        Ok(())
    }

    /// End the running game now and record it like any other finish.
    pub fn quit(&mut self) -> Result<(), TransitionError> {
        if !self.status().can_transition_to(GameStatus::GameOver) {
            return Err(TransitionError {
                from: self.status(),
                to: GameStatus::GameOver,
            });
        }
        if let Some(sim) = self.sim.as_mut() {
            sim.finish(EndReason::Quit);
            sim.take_events();
        }
        self.finalize(EndReason::Quit);
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.arena = Arena::new(width, height);
        if let Some(sim) = self.sim.as_mut() {
            sim.resize(self.arena);
        }
    }

    /// Pointer/touch shot at arena pixels. Ignored outside Playing.
    pub fn fire_at(&mut self, x: f32, y: f32) -> Vec<SimEvent> {
        if self.status() != GameStatus::Playing {
            return Vec::new();
        }
        let Some(sim) = self.sim.as_mut() else {
            return Vec::new();
        };
        sim.fire(x, y);
        let events = sim.take_events();
        self.flush_audio();
        events
    }

    /// Frame callback. `now` is wall-clock time on a monotonic base.
    pub fn tick(&mut self, now: Duration, gesture: GestureRead) -> Vec<SimEvent> {
        self.hand_present = gesture.hand_present();
        let events = match self.status() {
            GameStatus::Countdown => {
                self.tick_countdown(now);
                Vec::new()
            },
            GameStatus::Playing => self.tick_playing(now, gesture),
            GameStatus::Paused => {
                if self.auto_paused && self.hand_present && self.resume().is_ok() {
                    tracing::info!("Hand back, auto-resumed");
                }
                Vec::new()
            },
            GameStatus::Start | GameStatus::GameOver => Vec::new(),
        };
        self.flush_audio();
        events
    }

    pub fn hud(&self) -> HudSnapshot {
        let countdown = (self.status() == GameStatus::Countdown).then_some(self.countdown.value);
        let Some(sim) = self.sim.as_ref() else {
            return HudSnapshot {
                status: self.status(),
                mode: self.mode,
                hand_present: self.hand_present,
                countdown,
                ..HudSnapshot::default()
            };
        };
        let st = sim.state();
        HudSnapshot {
            status: self.status(),
            mode: self.mode,
            score: st.score,
            remaining_secs: st.remaining_secs,
            combo: st.combo,
            streak_banner: st.streak_timer > 0,
            power_ups: st
                .powerups
                .iter()
                .map(|p| PowerUpStatus {
                    kind: p.kind,
                    remaining_frames: p.remaining,
                })
                .collect(),
            difficulty: st.difficulty,
            lives: st.lives,
            aim: Some((st.aim_x, st.aim_y)),
            hand_present: self.hand_present,
            countdown,
            live_targets: st.targets.len(),
            stats: st.stats,
        }
    }

    fn enter_countdown(&mut self) {
        let spawner = match self.seed {
            Some(seed) => TargetSpawner::new(seed.wrapping_add(self.games_started)),
            None => TargetSpawner::from_entropy(),
        }
        .with_padding(self.config.spawn_padding);
        self.games_started += 1;
        self.sim = Some(Simulation::new(self.mode, self.config.clone(), self.arena, spawner));
        self.countdown = Countdown {
            value: self.config.countdown_secs,
            ..Countdown::default()
        };
        self.auto_paused = false;
        self.finalized = false;
        self.last_result = None;
        tracing::info!(mode = %self.mode, player = %self.player_name, "Countdown started");
    }

    fn tick_countdown(&mut self, now: Duration) {
        let started = *self.countdown.started_at.get_or_insert(now);
        let total = self.config.countdown_secs;
        let elapsed = now.saturating_sub(started).as_secs().min(total as u64) as u32;
        while self.countdown.announced < total && self.countdown.announced <= elapsed {
            self.cues.push(AudioCue::Countdown);
            self.countdown.announced += 1;
        }
        self.countdown.value = total - elapsed;
        if elapsed >= total && self.status.transition(GameStatus::Playing).is_ok() {
            self.cues.push(AudioCue::Go);
            if let Some(sim) = self.sim.as_mut() {
                sim.resync_clock();
            }
            tracing::info!(mode = %self.mode, "Go");
        }
    }

    fn tick_playing(&mut self, now: Duration, gesture: GestureRead) -> Vec<SimEvent> {
        let Some(sim) = self.sim.as_mut() else {
            return Vec::new();
        };
        let events = sim.update(&FrameInput { now, gesture });
        let hand_lost_frames = sim.state().hand_lost_frames;

        let finished = events.iter().find_map(|e| match e {
            SimEvent::Finished(reason) => Some(*reason),
            _ => None,
        });
        if let Some(reason) = finished {
            self.finalize(reason);
        } else if self.config.auto_pause
            && hand_lost_frames >= self.config.hand_lost_pause_frames
            && self.status.transition(GameStatus::Paused).is_ok()
        {
            self.auto_paused = true;
            tracing::info!(hand_lost_frames, "Hand lost, auto-paused");
        }
        events
    }

    /// Hand the result to persistence and move to GameOver. Runs at most
    /// once per game.
    fn finalize(&mut self, reason: EndReason) {
        if self.finalized {
            return;
        }
        let Some(sim) = self.sim.as_ref() else {
            return;
        };
        self.finalized = true;
        let st = sim.state();
        let result = SessionResult {
            player: self.player_name.clone(),
            mode: self.mode,
            score: st.score,
            stats: st.stats,
            reason,
        };
        tracing::info!(
            player = %result.player,
            mode = %result.mode,
            score = result.score,
            accuracy = result.stats.accuracy(),
            best_combo = result.stats.best_combo,
            "Game over"
        );

        let entry = HighScoreEntry::new(result.player.clone(), result.score);
        if let Err(e) = self.collaborators.high_scores.append(entry) {
            tracing::warn!(error = %e, "Failed to save local high score");
        }
        let record = ScoreRecord::new(result.player.clone(), result.score, result.stats, result.mode);
        if let Err(e) = self.collaborators.submitter.submit(record) {
            tracing::warn!(error = %e, "Failed to submit score");
        }

        if let Err(e) = self.status.transition(GameStatus::GameOver) {
            tracing::warn!(error = %e, "Unexpected status at game over");
        }
        self.auto_paused = false;
        self.last_result = Some(result);
    }

    fn flush_audio(&mut self) {
        let sink = self.collaborators.audio.as_mut();
        self.cues.flush(sink);
        if let Some(sim) = self.sim.as_mut() {
            sim.audio_mut().flush(sink);
        }
    }
}
