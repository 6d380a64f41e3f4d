//! Host configuration.
//!
//! Wraps the gameplay tuning with the settings only the headless host needs
//! (frame rate, run length, file locations). Loaded from `ecorunner.toml`;
//! a missing or unreadable file falls back to defaults.

use ecorunner_gameplay::GameplayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "ecorunner.toml";

/// Directory under the platform config/data dirs.
pub const APP_DIR_NAME: &str = "ecorunner";

/// Errors that can occur while reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Host configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Frame Settings ===
    /// Simulated frames per second
    pub target_fps: u32,
    /// How long to run, in simulated seconds
    pub run_seconds: f32,

    // === Session Settings ===
    /// Seed for weather and spawn placement (None = random)
    pub seed: Option<u64>,
    /// High score file (None = platform data directory)
    pub high_score_path: Option<PathBuf>,
    /// Tap to start over after each game over
    pub restart_on_game_over: bool,

    // === Autopilot ===
    /// Let the scripted input play
    pub autopilot: bool,
    /// Horizontal distance to an obstacle at which the autopilot jumps
    pub jump_distance: f32,

    // === Physics ===
    /// Downward acceleration applied to the hero while airborne
    pub gravity: f32,

    // === Gameplay ===
    /// Simulation tuning
    pub gameplay: GameplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            run_seconds: 120.0,

            seed: None,
            high_score_path: None,
            restart_on_game_over: true,

            autopilot: true,
            jump_distance: 110.0,

            gravity: 800.0,

            gameplay: GameplayConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting failures instead of falling back.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        // Working directory first, then the platform config dir
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }
        match dirs::config_dir() {
            Some(config_dir) => config_dir.join(APP_DIR_NAME).join(CONFIG_FILE),
            None => local,
        }
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.target_fps = self.target_fps.clamp(10, 240);
        self.run_seconds = self.run_seconds.clamp(0.0, 86_400.0);
        self.jump_distance = self.jump_distance.max(0.0);
        self.gravity = self.gravity.clamp(1.0, 10_000.0);

        if self.gameplay.seed.is_none() {
            self.gameplay.seed = self.seed;
        }
        self.gameplay.validate();
    }

    /// Seconds per simulated frame.
    #[must_use]
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Number of frames in a full run.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        (f64::from(self.run_seconds) * f64::from(self.target_fps)).round() as u64
    }
}
