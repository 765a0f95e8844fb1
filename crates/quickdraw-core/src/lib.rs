pub mod audio;
pub mod mode;
pub mod pose;
pub mod powerup;
pub mod records;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::audio::{AudioCue, AudioSink};
    use crate::pose::{INDEX_PIP, INDEX_TIP, Landmark, PoseFrame, WRIST};
    use crate::records::{HighScoreEntry, HighScoreSink, PersistError, ScoreRecord, ScoreSubmitter};

    /// [`PoseFrame::pointing`] with the index finger curled back toward the wrist.
    pub fn curled_hand_at(tip_x: f32, tip_y: f32) -> PoseFrame {
        let mut frame = PoseFrame::pointing(tip_x, tip_y);
        let wrist_y = frame.landmarks[WRIST].y;
        frame.landmarks[INDEX_PIP] = Landmark::new(tip_x, tip_y, 0.0);
        frame.landmarks[INDEX_TIP] = Landmark::new(tip_x, (tip_y + wrist_y) / 2.0, 0.0);
        frame
    }

    /// Audio sink that records every cue into a shared buffer.
    #[derive(Clone, Default)]
    pub struct RecordingAudio {
        pub cues: Arc<Mutex<Vec<AudioCue>>>,
    }

    impl RecordingAudio {
        pub fn take(&self) -> Vec<AudioCue> {
            std::mem::take(&mut *self.cues.lock().unwrap())
        }

        pub fn count(&self, cue: AudioCue) -> usize {
            self.cues.lock().unwrap().iter().filter(|c| **c == cue).count()
        }
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, cue: AudioCue) {
            self.cues.lock().unwrap().push(cue);
        }
    }

    /// Persistence collaborator that records submissions, optionally failing.
    #[derive(Clone, Default)]
    pub struct RecordingScores {
        pub high_scores: Arc<Mutex<Vec<HighScoreEntry>>>,
        pub records: Arc<Mutex<Vec<ScoreRecord>>>,
        pub fail: bool,
    }

    impl RecordingScores {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn high_score_count(&self) -> usize {
            self.high_scores.lock().unwrap().len()
        }

        pub fn record_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl HighScoreSink for RecordingScores {
        fn append(&mut self, entry: HighScoreEntry) -> Result<(), PersistError> {
            self.high_scores.lock().unwrap().push(entry);
            if self.fail {
                return Err(PersistError::Closed);
            }
            Ok(())
        }
    }

    impl ScoreSubmitter for RecordingScores {
        fn submit(&mut self, record: ScoreRecord) -> Result<(), PersistError> {
            self.records.lock().unwrap().push(record);
            if self.fail {
                return Err(PersistError::Closed);
            }
            Ok(())
        }
    }
}
