//! Day/night cycle, weather and parallax scrolling.
//!
//! The environment owns no colours or emitters. It computes:
//! - `day_time`: 1.0 = full day, 0.0 = full night
//! - the active weather
//! - one horizontal offset per background layer
//!
//! A cycle is split into four equal quarters: dawn ramps 0 → 1, day holds 1,
//! dusk ramps 1 → 0, night holds 0.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EnvironmentConfig, LayerConfig};
use crate::random::RandomSource;
use crate::weather::{WeatherChange, WeatherState, WeatherSystem};

/// Quarter of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    /// Brightening.
    Dawn,
    /// Full daylight.
    Day,
    /// Darkening.
    Dusk,
    /// Full night.
    Night,
}

impl DayPhase {
    /// Get the display name of this phase.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Day => "Day",
            Self::Dusk => "Dusk",
            Self::Night => "Night",
        }
    }
}

/// Background layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Sky backdrop.
    Sky,
    /// Distant mountains.
    Mountains,
    /// Tree line.
    Forest,
    /// Foreground strip.
    Foreground,
}

/// Scroll state of one background layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    /// Which layer this is.
    pub kind: LayerKind,
    /// Fraction of the scroll speed this layer moves at.
    pub factor: f32,
    /// Current horizontal offset. Always in `(-wrap/2, wrap/2]` after an update.
    pub offset: f32,
}

impl ParallaxLayer {
    fn from_config(config: &LayerConfig) -> Self {
        Self {
            kind: config.kind,
            factor: config.factor,
            offset: 0.0,
        }
    }

    fn scroll(&mut self, speed: f32, dt: f32, wrap_width: f32) {
        let half = wrap_width / 2.0;
        let offset = (self.offset - speed * dt * self.factor + half).rem_euclid(wrap_width) - half;
        // The left edge belongs to the right one
        self.offset = if offset <= -half { half } else { offset };
        if !self.offset.is_finite() {
            self.offset = 0.0;
        }
    }
}

/// What changed during an environment update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvironmentUpdate {
    /// Weather transition, if any.
    pub weather: Option<WeatherChange>,
    /// Phase transition as `(from, to)`, if any.
    pub phase: Option<(DayPhase, DayPhase)>,
}

/// Day time for a point in the cycle.
///
/// Pure function of `time_elapsed mod cycle_length`.
#[must_use]
pub fn day_time_at(time_elapsed: f64, cycle_length: f32) -> f32 {
    let cycle = f64::from(cycle_length);
    let quarter = cycle / 4.0;
    let phase = time_elapsed.rem_euclid(cycle);

    let value = if phase < quarter {
        phase / quarter
    } else if phase < quarter * 2.0 {
        1.0
    } else if phase < quarter * 3.0 {
        1.0 - (phase - quarter * 2.0) / quarter
    } else {
        0.0
    };
    (value as f32).clamp(0.0, 1.0)
}

/// Phase for a point in the cycle.
#[must_use]
pub fn phase_at(time_elapsed: f64, cycle_length: f32) -> DayPhase {
    let cycle = f64::from(cycle_length);
    let quarter = (time_elapsed.rem_euclid(cycle) / (cycle / 4.0)) as u32;
    match quarter {
        0 => DayPhase::Dawn,
        1 => DayPhase::Day,
        2 => DayPhase::Dusk,
        _ => DayPhase::Night,
    }
}

/// Day/night, weather and parallax state.
#[derive(Debug, Clone)]
pub struct EnvironmentCycle {
    /// Total environment time in seconds.
    time_elapsed: f64,
    /// Current day time.
    day_time: f32,
    /// Current quarter of the cycle.
    phase: DayPhase,
    /// Weather state machine.
    weather: WeatherSystem,
    /// Scrolling layers.
    layers: Vec<ParallaxLayer>,
    /// Cycle length in seconds.
    cycle_length: f32,
    /// Base scroll speed.
    scroll_speed: f32,
    /// Width after which a layer wraps.
    wrap_width: f32,
}

impl Default for EnvironmentCycle {
    fn default() -> Self {
        Self::new(&EnvironmentConfig::default())
    }
}

impl EnvironmentCycle {
    /// Create an environment at the start of the cycle.
    #[must_use]
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            time_elapsed: 0.0,
            day_time: day_time_at(0.0, config.cycle_length),
            phase: phase_at(0.0, config.cycle_length),
            weather: WeatherSystem::new(config),
            layers: config.layers.iter().map(ParallaxLayer::from_config).collect(),
            cycle_length: config.cycle_length,
            scroll_speed: config.scroll_speed,
            wrap_width: config.field_width,
        }
    }

    /// Advance the cycle, then evaluate weather, then scroll the layers.
    pub fn update(&mut self, dt: f32, rng: &mut dyn RandomSource) -> EnvironmentUpdate {
        self.time_elapsed += f64::from(dt);
        self.day_time = day_time_at(self.time_elapsed, self.cycle_length);

        let mut update = EnvironmentUpdate::default();

        let phase = phase_at(self.time_elapsed, self.cycle_length);
        if phase != self.phase {
            debug!(from = ?self.phase, to = ?phase, "day phase changed");
            update.phase = Some((self.phase, phase));
            self.phase = phase;
        }

        update.weather = self.weather.update(self.day_time, rng);

        for layer in &mut self.layers {
            layer.scroll(self.scroll_speed, dt, self.wrap_width);
        }

        update
    }

    /// Total environment time in seconds.
    #[must_use]
    pub fn time_elapsed(&self) -> f64 {
        self.time_elapsed
    }

    /// Current day time (0.0 = night, 1.0 = day).
    #[must_use]
    pub fn day_time(&self) -> f32 {
        self.day_time
    }

    /// Current quarter of the cycle.
    #[must_use]
    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    /// Current weather.
    #[must_use]
    pub fn weather(&self) -> WeatherState {
        self.weather.current()
    }

    /// Scroll state of every layer, back to front.
    #[must_use]
    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    /// Offset of a single layer, if it is registered.
    #[must_use]
    pub fn layer_offset(&self, kind: LayerKind) -> Option<f32> {
        self.layers.iter().find(|l| l.kind == kind).map(|l| l.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use proptest::prelude::*;

    #[test]
    fn test_day_time_reference_points() {
        assert!((day_time_at(7.5, 60.0) - 0.5).abs() < 1e-6);
        assert!((day_time_at(22.5, 60.0) - 1.0).abs() < 1e-6);
        assert!((day_time_at(37.5, 60.0) - 0.5).abs() < 1e-6);
        assert!(day_time_at(52.5, 60.0).abs() < 1e-6);
        // Wraps every cycle.
        assert!((day_time_at(67.5, 60.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(phase_at(0.0, 60.0), DayPhase::Dawn);
        assert_eq!(phase_at(15.0, 60.0), DayPhase::Day);
        assert_eq!(phase_at(30.0, 60.0), DayPhase::Dusk);
        assert_eq!(phase_at(45.0, 60.0), DayPhase::Night);
        assert_eq!(phase_at(60.0, 60.0), DayPhase::Dawn);
        assert_eq!(DayPhase::Dusk.display_name(), "Dusk");
    }

    #[test]
    fn test_update_tracks_time_and_phase() {
        // Never rolls weather.
        let mut rng = ScriptedRandom::new(vec![99]);
        let mut env = EnvironmentCycle::default();

        let mut phase_changes = 0;
        for _ in 0..160 {
            if env.update(0.1, &mut rng).phase.is_some() {
                phase_changes += 1;
            }
        }
        assert!((env.time_elapsed() - 16.0).abs() < 1e-3);
        assert_eq!(env.phase(), DayPhase::Day);
        assert_eq!(phase_changes, 1);
        assert!((env.day_time() - 1.0).abs() < 1e-6);
        assert_eq!(env.weather(), WeatherState::Clear);
    }

    #[test]
    fn test_weather_starts_at_night_and_clears_by_day() {
        let mut rng = ScriptedRandom::new(vec![45]);
        let mut env = EnvironmentCycle::default();

        // Start of dawn is dark enough to roll.
        let update = env.update(0.1, &mut rng);
        assert_eq!(update.weather.map(|c| c.to), Some(WeatherState::Snow));

        // Ride through until day time exceeds 0.5 (7.5 s into dawn).
        let mut cleared_at = None;
        for _ in 0..100 {
            if let Some(change) = env.update(0.1, &mut rng).weather {
                assert_eq!(change.to, WeatherState::Clear);
                cleared_at = Some(env.day_time());
                break;
            }
        }
        let cleared_at = cleared_at.expect("weather should clear during dawn");
        assert!(cleared_at > 0.5);
    }

    #[test]
    fn test_parallax_offsets_and_wrap() {
        let mut rng = ScriptedRandom::new(vec![99]);
        let mut env = EnvironmentCycle::default();

        env.update(0.1, &mut rng);
        // 200 * 0.1 * 0.4
        let foreground = env.layer_offset(LayerKind::Foreground).expect("layer registered");
        assert!((foreground + 8.0).abs() < 1e-4);

        for _ in 0..200 {
            env.update(0.1, &mut rng);
        }
        for layer in env.layers() {
            assert!(layer.offset > -400.0, "{:?} offset {}", layer.kind, layer.offset);
            assert!(layer.offset <= 400.0);
        }
    }

    #[test]
    fn test_parallax_survives_runaway_factor() {
        let mut layer = ParallaxLayer {
            kind: LayerKind::Sky,
            factor: f32::INFINITY,
            offset: 0.0,
        };
        layer.scroll(200.0, 0.016, 800.0);
        assert_eq!(layer.offset, 0.0);

        layer.factor = 1.0e30;
        layer.scroll(200.0, 0.016, 800.0);
        assert!(layer.offset > -400.0 && layer.offset <= 400.0);
    }

    proptest! {
        #[test]
        fn prop_parallax_offset_stays_in_wrap(
            factor in 0.0f32..1_000.0,
            steps in prop::collection::vec(0.0f32..0.1, 1..200),
        ) {
            let mut layer = ParallaxLayer { kind: LayerKind::Forest, factor, offset: 0.0 };
            for dt in steps {
                layer.scroll(10_000.0, dt, 800.0);
                prop_assert!(layer.offset > -400.0 && layer.offset <= 400.0);
            }
        }

        #[test]
        fn prop_day_time_in_unit_range(t in 0.0f64..10_000.0) {
            let value = day_time_at(t, 60.0);
            prop_assert!((0.0..=1.0).contains(&value));
        }

        #[test]
        fn prop_day_time_is_periodic(t in 0.0f64..1_000.0) {
            let a = day_time_at(t, 60.0);
            let b = day_time_at(t + 60.0, 60.0);
            prop_assert!((a - b).abs() < 1e-4);
        }
    }
}
