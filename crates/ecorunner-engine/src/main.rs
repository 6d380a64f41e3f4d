//! # EcoRunner Engine
//!
//! Headless host for the EcoRunner simulation core.
//!
//! Ties the core to concrete collaborators:
//! - File-backed high score under the platform data directory
//! - Audio cues routed to the log
//! - A kinematic physics stand-in that moves entities and reports contacts
//! - An optional autopilot that plays the game
//!
//! Usage: `ecorunner [CONFIG_PATH]`. Set `ECORUNNER_LOG_FORMAT=json` for
//! JSON log lines.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use ecorunner_engine::EngineConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::from_default_env().add_directive("ecorunner=info".parse()?);
    let json = std::env::var("ECORUNNER_LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("EcoRunner starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(EngineConfig::config_path, PathBuf::from);
    let mut config = EngineConfig::load_from(&config_path);
    config.validate();

    let summary = ecorunner_engine::run(config)?;
    info!(
        frames = summary.frames,
        games_over = summary.games_over,
        best_score = summary.best_score,
        power_ups = summary.power_ups,
        high_score = summary.high_score,
        "Run finished"
    );

    info!("EcoRunner shutdown complete");
    Ok(())
}
