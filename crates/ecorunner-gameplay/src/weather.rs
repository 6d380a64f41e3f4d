//! Night-time weather.
//!
//! Weather is a three-state machine driven entirely by the current day time:
//! - Clear → Rain or Snow: only while it is dark and nothing is falling, one
//!   roll per tick
//! - Rain or Snow → Clear: as soon as the day is bright enough
//! - Between the two thresholds nothing changes

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EnvironmentConfig;
use crate::random::RandomSource;

/// Weather currently active in the scene. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeatherState {
    /// No precipitation.
    #[default]
    Clear,
    /// Rain particle emitter active.
    Rain,
    /// Snow particle emitter active.
    Snow,
}

impl WeatherState {
    /// Get the display name for this weather state.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
        }
    }

    /// Check if something is falling from the sky.
    #[must_use]
    pub fn is_precipitating(self) -> bool {
        !matches!(self, Self::Clear)
    }

    /// Get all weather states.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Clear, Self::Rain, Self::Snow]
    }
}

/// A weather transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherChange {
    /// Weather before the tick.
    pub from: WeatherState,
    /// Weather after the tick.
    pub to: WeatherState,
}

/// Manages the weather state and its thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSystem {
    /// Current weather state.
    current: WeatherState,
    /// Day time below which weather may start.
    start_below: f32,
    /// Day time above which weather clears.
    clear_above: f32,
    /// Percent chance of rain per roll.
    rain_chance: u32,
    /// Percent chance of snow per roll.
    snow_chance: u32,
    /// Number of rolls made so far.
    rolls: u64,
}

impl Default for WeatherSystem {
    fn default() -> Self {
        Self::new(&EnvironmentConfig::default())
    }
}

impl WeatherSystem {
    /// Create a weather system with clear skies.
    #[must_use]
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            current: WeatherState::Clear,
            start_below: config.weather_start_below,
            clear_above: config.weather_clear_above,
            rain_chance: config.rain_chance,
            snow_chance: config.snow_chance,
            rolls: 0,
        }
    }

    /// Get the current weather state.
    #[must_use]
    pub fn current(&self) -> WeatherState {
        self.current
    }

    /// Number of weather rolls made so far.
    #[must_use]
    pub fn rolls(&self) -> u64 {
        self.rolls
    }

    /// Evaluate the weather for the given day time.
    ///
    /// Returns the transition, if one happened.
    pub fn update(&mut self, day_time: f32, rng: &mut dyn RandomSource) -> Option<WeatherChange> {
        let next = if day_time < self.start_below && self.current == WeatherState::Clear {
            self.roll(rng)
        } else if day_time > self.clear_above {
            WeatherState::Clear
        } else {
            self.current
        };

        if next == self.current {
            return None;
        }

        let change = WeatherChange {
            from: self.current,
            to: next,
        };
        self.current = next;
        debug!(from = ?change.from, to = ?change.to, day_time, "weather changed");
        Some(change)
    }

    /// Draw in `[0, 100)`: the first band is rain, the second snow.
    fn roll(&mut self, rng: &mut dyn RandomSource) -> WeatherState {
        self.rolls += 1;
        let roll = rng.below(100);
        if roll < self.rain_chance {
            WeatherState::Rain
        } else if roll < self.rain_chance + self.snow_chance {
            WeatherState::Snow
        } else {
            WeatherState::Clear
        }
    }
}
