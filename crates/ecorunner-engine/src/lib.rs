//! # EcoRunner Engine
//!
//! Host-side collaborators for the EcoRunner simulation core and the
//! headless run loop that drives it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod audio;
pub mod autopilot;
pub mod config;
pub mod high_score;
pub mod physics;

pub use app::{run, RunSummary};
pub use config::EngineConfig;
