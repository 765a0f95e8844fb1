use serde::{Deserialize, Serialize};

use quickdraw_core::pose::{INDEX_PIP, INDEX_TIP, PoseFrame, WRIST};

/// Tunables for the recoil-trigger recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Smoothed vertical velocity (normalized units per sample) below which a
    /// flick counts as a trigger pull. Negative means upward on screen.
    pub velocity_threshold: f32,
    /// Samples after a fire-edge before another one can be emitted.
    pub cooldown_samples: u32,
    /// EMA weight given to the newest velocity sample.
    pub velocity_smoothing: f32,
    /// Per-sample multiplicative decay of the recoil amplitude.
    pub recoil_decay: f32,
    /// Fingertip must be this many times farther from the wrist than the
    /// index joint to count as extended.
    pub extension_margin: f32,
    /// Aim interpolation factor when the hand is still.
    pub aim_min_factor: f32,
    /// Upper bound on the aim interpolation factor.
    pub aim_max_factor: f32,
    /// How quickly the interpolation factor grows with displacement.
    pub aim_gain: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: -0.015,
            cooldown_samples: 12,
            velocity_smoothing: 0.5,
            recoil_decay: 0.85,
            extension_margin: 1.05,
            aim_min_factor: 0.15,
            aim_max_factor: 0.5,
            aim_gain: 3.0,
        }
    }
}

/// Confidence reported when the index finger looks extended.
pub const CONFIDENCE_EXTENDED: f32 = 1.0;
/// Confidence reported otherwise.
pub const CONFIDENCE_CURLED: f32 = 0.3;

/// Filter state for one tracking session. Never reset between games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    pub aim_x: f32,
    pub aim_y: f32,
    pub prev_raw_y: f32,
    pub prev_prev_raw_y: f32,
    pub smoothed_velocity_y: f32,
    pub acceleration_y: f32,
    pub cooldown: u32,
    pub fire_edge: bool,
    pub recoil: f32,
    pub confidence: f32,
    pub hand_present: bool,
    /// Whether the position history holds a real sample yet.
    seeded: bool,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            aim_x: 0.5,
            aim_y: 0.5,
            prev_raw_y: 0.5,
            prev_prev_raw_y: 0.5,
            smoothed_velocity_y: 0.0,
            acceleration_y: 0.0,
            cooldown: 0,
            fire_edge: false,
            recoil: 0.0,
            confidence: 0.0,
            hand_present: false,
            seeded: false,
        }
    }
}

impl GestureState {
    /// Consume the fire-edge. Returns true at most once per emitted edge.
    pub fn take_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire_edge)
    }
}

/// Result of feeding one pose sample to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureOutput {
    pub aim_x: f32,
    pub aim_y: f32,
    pub fire: bool,
    pub confidence: f32,
    pub recoil: f32,
    pub hand_present: bool,
}

/// Turns a stream of optional hand poses into a smoothed aim point and
/// debounced fire-edges triggered by a quick upward flick.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: RecognizerConfig,
    state: GestureState,
}

impl GestureRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Consume the pending fire-edge, if any.
    pub fn take_fire(&mut self) -> bool {
        self.state.take_fire()
    }

    /// Feed one pose callback. `None` (or a malformed frame) means no hand:
    /// aim and velocity history are left untouched, but the cooldown keeps
    /// counting down and the recoil keeps decaying.
    pub fn update(&mut self, frame: Option<&PoseFrame>) -> GestureOutput {
        let frame = frame.filter(|f| match f.validate() {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(%reason, "Discarding pose frame");
                false
            },
        });

        let fired = match frame {
            Some(f) => self.observe(f),
            None => {
                self.state.hand_present = false;
                self.tick_cooldown();
                false
            },
        };
        self.state.fire_edge = fired;
        self.state.recoil *= self.config.recoil_decay;

        GestureOutput {
            aim_x: self.state.aim_x,
            aim_y: self.state.aim_y,
            fire: fired,
            confidence: self.state.confidence,
            recoil: self.state.recoil,
            hand_present: self.state.hand_present,
        }
    }

    fn tick_cooldown(&mut self) {
        self.state.cooldown = self.state.cooldown.saturating_sub(1);
    }

    /// Process a validated frame; returns whether a fire-edge was detected.
    fn observe(&mut self, frame: &PoseFrame) -> bool {
        let tip = frame.landmarks[INDEX_TIP];
        let raw_x = 1.0 - tip.x;
        let raw_y = tip.y;
        let s = &mut self.state;

        if !s.seeded {
            s.prev_raw_y = raw_y;
            s.prev_prev_raw_y = raw_y;
            s.seeded = true;
        }

        // Velocity and acceleration (negative = moving up on screen)
        let instant_velocity = raw_y - s.prev_raw_y;
        let a = self.config.velocity_smoothing;
        s.smoothed_velocity_y = s.smoothed_velocity_y * (1.0 - a) + instant_velocity * a;
        let prev_velocity = s.prev_raw_y - s.prev_prev_raw_y;
        s.acceleration_y = instant_velocity - prev_velocity;
        s.prev_prev_raw_y = s.prev_raw_y;
        s.prev_raw_y = raw_y;

        // Aim: fast moves track tightly, idle jitter is damped
        let dx = raw_x - s.aim_x;
        let dy = raw_y - s.aim_y;
        let moved = (dx * dx + dy * dy).sqrt();
        let factor = (self.config.aim_min_factor + moved * self.config.aim_gain)
            .min(self.config.aim_max_factor);
        s.aim_x = (s.aim_x + dx * factor).clamp(0.0, 1.0);
        s.aim_y = (s.aim_y + dy * factor).clamp(0.0, 1.0);

        s.cooldown = s.cooldown.saturating_sub(1);
        let fired = s.smoothed_velocity_y < self.config.velocity_threshold && s.cooldown == 0;
        if fired {
            s.cooldown = self.config.cooldown_samples;
            s.recoil = 1.0;
        }

        let wrist = frame.landmarks[WRIST];
        let pip = frame.landmarks[INDEX_PIP];
        let extended = tip.distance(&wrist) > pip.distance(&wrist) * self.config.extension_margin;
        s.confidence = if extended {
            CONFIDENCE_EXTENDED
        } else {
            CONFIDENCE_CURLED
        };
        s.hand_present = true;

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quickdraw_core::pose::Landmark;
    use quickdraw_core::test_helpers::curled_hand_at;

    fn feed(rec: &mut GestureRecognizer, ys: &[f32]) -> Vec<bool> {
        ys.iter()
            .map(|&y| rec.update(Some(&PoseFrame::pointing(0.5, y))).fire)
            .collect()
    }

    #[test]
    fn still_hand_never_fires() {
        let mut rec = GestureRecognizer::default();
        let fires = feed(&mut rec, &[0.6; 60]);
        assert!(fires.iter().all(|f| !f));
    }

    #[test]
    fn first_sample_does_not_spike_velocity() {
        let mut rec = GestureRecognizer::default();
        let out = rec.update(Some(&PoseFrame::pointing(0.5, 0.05)));
        assert!(!out.fire);
        assert_eq!(rec.state().smoothed_velocity_y, 0.0);
    }

    #[test]
    fn upward_flick_fires_once() {
        let mut rec = GestureRecognizer::default();
        let fires = feed(&mut rec, &[0.7, 0.7, 0.7, 0.62, 0.55, 0.55, 0.56, 0.58]);
        assert_eq!(fires.iter().filter(|f| **f).count(), 1);
        assert!(fires[3] || fires[4]);
    }

    #[test]
    fn downward_motion_never_fires() {
        let mut rec = GestureRecognizer::default();
        let ys: Vec<f32> = (0..40).map(|i| 0.1 + i as f32 * 0.02).collect();
        assert!(feed(&mut rec, &ys).iter().all(|f| !f));
    }

    #[test]
    fn fire_resets_recoil_then_decays() {
        let mut rec = GestureRecognizer::default();
        feed(&mut rec, &[0.7, 0.6]);
        assert!((rec.state().recoil - 0.85).abs() < 1e-6);
        rec.update(Some(&PoseFrame::pointing(0.5, 0.6)));
        assert!((rec.state().recoil - 0.85 * 0.85).abs() < 1e-6);
    }

    #[test]
    fn aim_is_mirrored_horizontally() {
        let mut rec = GestureRecognizer::default();
        for _ in 0..200 {
            rec.update(Some(&PoseFrame::pointing(0.2, 0.5)));
        }
        assert!((rec.state().aim_x - 0.8).abs() < 1e-3);
        assert!((rec.state().aim_y - 0.5).abs() < 1e-3);
    }

    #[test]
    fn large_moves_track_faster_than_small_ones() {
        let mut near = GestureRecognizer::default();
        near.update(Some(&PoseFrame::pointing(0.48, 0.5)));
        let near_step = near.state().aim_x - 0.5;

        let mut far = GestureRecognizer::default();
        far.update(Some(&PoseFrame::pointing(0.1, 0.5)));
        let far_step = far.state().aim_x - 0.5;

        // 0.02 offset at factor 0.21 vs 0.4 offset at the 0.5 cap
        assert!((near_step - 0.02 * 0.21).abs() < 1e-4);
        assert!((far_step - 0.4 * 0.5).abs() < 1e-4);
    }

    #[test]
    fn absent_frame_keeps_aim_and_history() {
        let mut rec = GestureRecognizer::default();
        feed(&mut rec, &[0.4, 0.42, 0.45]);
        let before = rec.state().clone();

        let out = rec.update(None);
        assert!(!out.hand_present);
        assert!(!out.fire);
        let after = rec.state();
        assert_eq!(after.aim_x, before.aim_x);
        assert_eq!(after.aim_y, before.aim_y);
        assert_eq!(after.prev_raw_y, before.prev_raw_y);
        assert_eq!(after.smoothed_velocity_y, before.smoothed_velocity_y);
    }

    #[test]
    fn cooldown_counts_down_while_hand_absent() {
        let mut rec = GestureRecognizer::default();
        feed(&mut rec, &[0.7, 0.6]);
        assert_eq!(rec.state().cooldown, 12);
        for _ in 0..5 {
            rec.update(None);
        }
        assert_eq!(rec.state().cooldown, 7);
    }

    #[test]
    fn malformed_frame_treated_as_absent() {
        let mut rec = GestureRecognizer::default();
        feed(&mut rec, &[0.5, 0.5]);
        let before = rec.state().clone();

        let mut bad = PoseFrame::pointing(0.5, 0.1);
        bad.landmarks[INDEX_TIP] = Landmark::new(f32::NAN, 0.1, 0.0);
        let out = rec.update(Some(&bad));

        assert!(!out.hand_present);
        assert!(!out.fire);
        assert_eq!(rec.state().aim_x, before.aim_x);
        assert_eq!(rec.state().smoothed_velocity_y, before.smoothed_velocity_y);
    }

    #[test]
    fn confidence_reflects_finger_extension() {
        let mut rec = GestureRecognizer::default();
        assert_eq!(rec.update(Some(&PoseFrame::pointing(0.5, 0.3))).confidence, CONFIDENCE_EXTENDED);
        assert_eq!(
            rec.update(Some(&curled_hand_at(0.5, 0.3))).confidence,
            CONFIDENCE_CURLED
        );
    }

    #[test]
    fn take_fire_consumes_edge() {
        let mut rec = GestureRecognizer::default();
        feed(&mut rec, &[0.7, 0.6]);
        assert!(rec.take_fire());
        assert!(!rec.take_fire());
    }

    mod proptests {
        use super::*;

        proptest! {
            #[test]
            fn aim_always_within_unit_square(
                samples in proptest::collection::vec(
                    proptest::option::of((-0.5f32..1.5, -0.5f32..1.5)),
                    1..120,
                )
            ) {
                let mut rec = GestureRecognizer::default();
                for sample in samples {
                    let frame = sample.map(|(x, y)| {
                        let mut f = PoseFrame::pointing(0.5, 0.5);
                        f.landmarks[INDEX_TIP] = Landmark::new(x, y, 0.0);
                        f
                    });
                    let out = rec.update(frame.as_ref());
                    prop_assert!((0.0..=1.0).contains(&out.aim_x));
                    prop_assert!((0.0..=1.0).contains(&out.aim_y));
                }
            }

            #[test]
            fn sustained_upward_motion_fires_once_per_cooldown(step in 0.035f32..0.06) {
                let mut rec = GestureRecognizer::default();
                let n = (0.9 / step) as usize + 1;
                let ys: Vec<f32> = (0..n).map(|i| 0.95 - step * i as f32).collect();
                let fired: Vec<usize> = feed(&mut rec, &ys)
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| **f)
                    .map(|(i, _)| i)
                    .collect();

                prop_assert_eq!(fired.first().copied(), Some(1));
                for pair in fired.windows(2) {
                    prop_assert_eq!(pair[1] - pair[0], 12);
                }
                prop_assert_eq!(fired.len(), (n - 2) / 12 + 1);
            }
        }
    }
}
