//! Interfaces to the outside world.
//!
//! The session talks to audio and persistence through these traits and
//! owns its implementations, so tests can inject in-memory doubles and the
//! core never touches process-wide state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ecorunner_common::{AudioError, PersistenceError};
use serde::{Deserialize, Serialize};

/// Sounds the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Looping background track.
    BackgroundMusic,
    /// Power-up collected.
    PowerUpPickup,
}

impl AudioCue {
    /// Asset name the audio backend resolves.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::BackgroundMusic => "background_music.mp3",
            Self::PowerUpPickup => "powerup.wav",
        }
    }

    /// Whether the cue loops until stopped.
    #[must_use]
    pub fn is_looping(self) -> bool {
        matches!(self, Self::BackgroundMusic)
    }
}

/// Fire-and-forget audio output.
pub trait AudioSink: Send {
    /// Start playing a cue.
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError>;

    /// Stop background playback.
    fn stop(&mut self) -> Result<(), AudioError>;
}

/// Storage for the single persisted integer.
pub trait HighScoreStore: Send {
    /// Read the stored high score.
    fn load(&self) -> Result<u64, PersistenceError>;

    /// Replace the stored high score. Last write wins.
    fn save(&mut self, high_score: u64) -> Result<(), PersistenceError>;
}

/// Audio sink that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio sink that records every call. Clones share the same log, so a test
/// can keep one handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Arc<Mutex<AudioLog>>,
    fail: bool,
}

/// Calls seen by a [`RecordingAudio`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioLog {
    /// Cues played, in order.
    pub played: Vec<AudioCue>,
    /// Number of stop calls.
    pub stops: u32,
}

impl RecordingAudio {
    /// Create a sink that records and succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that records and then reports a device failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the calls so far.
    #[must_use]
    pub fn log(&self) -> AudioLog {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn outcome(&self) -> Result<(), AudioError> {
        if self.fail {
            Err(AudioError::DeviceUnavailable("recording sink".to_string()))
        } else {
            Ok(())
        }
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        if let Ok(mut log) = self.log.lock() {
            log.played.push(cue);
        }
        self.outcome()
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Ok(mut log) = self.log.lock() {
            log.stops += 1;
        }
        self.outcome()
    }
}

/// High score kept in memory. Clones share the stored value.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    value: Arc<Mutex<Option<u64>>>,
    writes: Arc<AtomicU32>,
}

impl MemoryHighScore {
    /// Empty store; loading reports [`PersistenceError::Missing`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a value.
    #[must_use]
    pub fn with_value(high_score: u64) -> Self {
        let store = Self::default();
        if let Ok(mut value) = store.value.lock() {
            *value = Some(high_score);
        }
        store
    }

    /// Value currently stored.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        self.value.lock().ok().and_then(|value| *value)
    }

    /// Number of successful saves.
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<u64, PersistenceError> {
        let value = self
            .value
            .lock()
            .map_err(|_| PersistenceError::Unavailable("store lock poisoned".to_string()))?;
        value.ok_or(PersistenceError::Missing)
    }

    fn save(&mut self, high_score: u64) -> Result<(), PersistenceError> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| PersistenceError::Unavailable("store lock poisoned".to_string()))?;
        *value = Some(high_score);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_names() {
        assert_eq!(AudioCue::PowerUpPickup.file_name(), "powerup.wav");
        assert!(AudioCue::BackgroundMusic.is_looping());
        assert!(!AudioCue::PowerUpPickup.is_looping());
    }

    #[test]
    fn test_recording_audio_shares_log() {
        let handle = RecordingAudio::new();
        let mut sink = handle.clone();
        sink.play(AudioCue::BackgroundMusic).expect("play");
        sink.stop().expect("stop");

        let log = handle.log();
        assert_eq!(log.played, vec![AudioCue::BackgroundMusic]);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn test_failing_audio_still_records() {
        let handle = RecordingAudio::failing();
        let mut sink = handle.clone();
        assert!(sink.stop().is_err());
        assert_eq!(handle.log().stops, 1);
    }

    #[test]
    fn test_memory_high_score() {
        let mut store = MemoryHighScore::new();
        assert!(matches!(store.load(), Err(PersistenceError::Missing)));

        store.save(42).expect("save");
        assert_eq!(store.load().expect("load"), 42);
        assert_eq!(store.writes(), 1);

        let seeded = MemoryHighScore::with_value(7);
        assert_eq!(seeded.value(), Some(7));
    }
}
