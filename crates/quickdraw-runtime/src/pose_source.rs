use std::collections::VecDeque;
use std::time::Duration;

use quickdraw_core::pose::PoseFrame;

/// Supplier of hand-pose samples, polled once per pose tick. Camera capture
/// and landmark extraction live behind this.
pub trait PoseSource: Send {
    /// `None` when no hand is visible.
    fn next_frame(&mut self, elapsed: Duration) -> Option<PoseFrame>;
}

/// Replays a fixed list of samples, then reports no hand.
#[derive(Debug, Default)]
pub struct ScriptedPoses {
    frames: VecDeque<Option<PoseFrame>>,
}

impl ScriptedPoses {
    pub fn new(frames: impl IntoIterator<Item = Option<PoseFrame>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: Option<PoseFrame>) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for ScriptedPoses {
    fn next_frame(&mut self, _elapsed: Duration) -> Option<PoseFrame> {
        self.frames.pop_front().flatten()
    }
}

/// Synthetic player for headless demos: sweeps the aim around the arena,
/// flicks the finger up on a fixed period and drops out of view now and
/// then.
#[derive(Debug, Clone)]
pub struct DemoHand {
    pub flick_every: Duration,
    pub flick_length: Duration,
    pub flick_height: f32,
    pub dropout_every: Duration,
    pub dropout_length: Duration,
}

impl Default for DemoHand {
    fn default() -> Self {
        Self {
            flick_every: Duration::from_millis(900),
            flick_length: Duration::from_millis(150),
            flick_height: 0.2,
            dropout_every: Duration::from_secs(20),
            dropout_length: Duration::from_millis(800),
        }
    }
}

impl DemoHand {
    fn phase_in(elapsed: Duration, period: Duration) -> Duration {
        if period.is_zero() {
            return Duration::MAX;
        }
        Duration::from_nanos((elapsed.as_nanos() % period.as_nanos()) as u64)
    }
}

impl PoseSource for DemoHand {
    fn next_frame(&mut self, elapsed: Duration) -> Option<PoseFrame> {
        let dropout_phase = Self::phase_in(elapsed, self.dropout_every);
        if elapsed > self.dropout_every && dropout_phase < self.dropout_length {
            return None;
        }

        let t = elapsed.as_secs_f32();
        // Camera space is mirrored, so the aim moves opposite to the tip in x.
        let x = 0.5 + 0.35 * (t * 0.7).sin();
        let mut y = 0.55 + 0.25 * (t * 1.1).sin();

        let flick_phase = Self::phase_in(elapsed, self.flick_every);
        if flick_phase < self.flick_length {
            let progress = flick_phase.as_secs_f32() / self.flick_length.as_secs_f32();
            y -= progress * self.flick_height;
        }
        Some(PoseFrame::pointing(x, y))
    }
}
