//! Error types for EcoRunner.

use thiserror::Error;

/// Top-level error type for EcoRunner operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// High-score persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Failures reported by a high-score store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No record has been written yet
    #[error("no high score recorded")]
    Missing,

    /// The stored record could not be decoded
    #[error("corrupt high score record: {0}")]
    Corrupt(String),

    /// The backing store could not be reached
    #[error("high score store unavailable: {0}")]
    Unavailable(String),

    /// IO failure while reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by an audio sink.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The output device is gone
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Result type alias for EcoRunner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
