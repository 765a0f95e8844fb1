use quickdraw_core::audio::{AudioCue, AudioSink};

/// Headless audio sink: every cue becomes a debug event.
#[derive(Debug, Default)]
pub struct TracingAudio {
    played: u64,
}

impl TracingAudio {
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.played += 1;
        tracing::debug!(cue = cue.as_str(), n = self.played, "Audio cue");
    }
}
