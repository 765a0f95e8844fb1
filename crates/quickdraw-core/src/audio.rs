use serde::{Deserialize, Serialize};

/// Audio cues the simulation requests. Synthesis is up to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Shoot,
    Hit,
    Bomb,
    PowerUp,
    Countdown,
    Go,
    Streak,
}

impl AudioCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shoot => "shoot",
            Self::Hit => "hit",
            Self::Bomb => "bomb",
            Self::PowerUp => "powerup",
            Self::Countdown => "countdown",
            Self::Go => "go",
            Self::Streak => "streak",
        }
    }
}

/// Fire-and-forget audio collaborator. Implementations must not block and
/// must swallow their own failures.
pub trait AudioSink: Send {
    fn play(&mut self, cue: AudioCue);
}

/// Sink that drops every cue.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Queue of cues produced during a frame, flushed to a sink afterwards.
#[derive(Debug, Default)]
pub struct AudioCueQueue {
    cues: Vec<AudioCue>,
}

impl AudioCueQueue {
    pub fn push(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn pending(&self) -> &[AudioCue] {
        &self.cues
    }

    /// Hand every queued cue to `sink` in emission order.
    pub fn flush(&mut self, sink: &mut dyn AudioSink) {
        for cue in self.cues.drain(..) {
            sink.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<AudioCue>);

    impl AudioSink for Collect {
        fn play(&mut self, cue: AudioCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn flush_preserves_order_and_empties_queue() {
        let mut queue = AudioCueQueue::default();
        queue.push(AudioCue::Shoot);
        queue.push(AudioCue::Hit);
        queue.push(AudioCue::Streak);

        let mut sink = Collect::default();
        queue.flush(&mut sink);

        assert_eq!(sink.0, vec![AudioCue::Shoot, AudioCue::Hit, AudioCue::Streak]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cue_names_match_sink_contract() {
        assert_eq!(AudioCue::PowerUp.as_str(), "powerup");
        assert_eq!(AudioCue::Go.as_str(), "go");
    }
}
