//! Audio sink for the headless host: every cue becomes a log line.

use ecorunner_common::AudioError;
use ecorunner_gameplay::{AudioCue, AudioSink};
use tracing::info;

/// Logs cues instead of playing them.
#[derive(Debug, Default)]
pub struct TracingAudio {
    /// Looping cue currently "playing"
    background: Option<AudioCue>,
    /// One-shot cues played so far
    effects_played: u64,
}

impl TracingAudio {
    /// Create a silent sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looping cue currently active, if any.
    #[must_use]
    pub fn background(&self) -> Option<AudioCue> {
        self.background
    }

    /// Number of one-shot cues played.
    #[must_use]
    pub fn effects_played(&self) -> u64 {
        self.effects_played
    }
}

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        if cue.is_looping() {
            info!(file = cue.file_name(), "background music started");
            self.background = Some(cue);
        } else {
            info!(file = cue.file_name(), "sound effect");
            self.effects_played += 1;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(cue) = self.background.take() {
            info!(file = cue.file_name(), "background music stopped");
        }
        Ok(())
    }
}
