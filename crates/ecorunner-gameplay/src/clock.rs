//! Frame clock.
//!
//! Turns the host's raw frame delta into the dt every other system consumes:
//! clamped to `[0, max_dt]`, with the first sample after a (re)start forced to
//! zero because it has no previous instant to measure from.

use crate::config::ClockConfig;

/// Per-tick elapsed-time sanitiser.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Maximum delta time to prevent catch-up after a suspend
    max_dt: f32,
    /// Whether the next sample is the first since (re)start
    awaiting_first_sample: bool,
    /// Total sanitised time handed out
    elapsed: f64,
    /// Number of samples taken
    ticks: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

impl Clock {
    /// Create a clock from configuration.
    ///
    /// A `max_dt` that is not a positive finite number falls back to the
    /// default.
    #[must_use]
    pub fn new(config: &ClockConfig) -> Self {
        let max_dt = if config.max_dt.is_finite() && config.max_dt > 0.0 {
            config.max_dt
        } else {
            ClockConfig::default().max_dt
        };
        Self {
            max_dt,
            awaiting_first_sample: true,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// Sanitise a raw frame delta.
    ///
    /// Negative and non-finite inputs become zero; large ones are capped at
    /// `max_dt`.
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        self.ticks += 1;

        if self.awaiting_first_sample {
            self.awaiting_first_sample = false;
            return 0.0;
        }

        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        };
        self.elapsed += f64::from(dt);
        dt
    }

    /// Forget all history; the next sample is treated as the first.
    pub fn reset(&mut self) {
        self.awaiting_first_sample = true;
        self.elapsed = 0.0;
        self.ticks = 0;
    }

    /// Largest dt a tick may consume.
    #[must_use]
    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }

    /// Sum of every dt returned since the last reset.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of samples taken since the last reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_zero() {
        let mut clock = Clock::default();
        assert_eq!(clock.advance(0.05), 0.0);
        assert!((clock.advance(0.05) - 0.05).abs() < f32::EPSILON);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_clamps_range() {
        let mut clock = Clock::default();
        clock.advance(0.0);

        assert!((clock.advance(5.0) - 0.1).abs() < f32::EPSILON);
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.advance(f32::INFINITY), 0.0);
        assert!((clock.elapsed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reset_restores_first_sample() {
        let mut clock = Clock::default();
        clock.advance(0.0);
        clock.advance(0.05);
        clock.reset();

        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.advance(0.05), 0.0);
    }

    #[test]
    fn test_unusable_max_dt_falls_back() {
        for max_dt in [f32::NAN, f32::INFINITY, -1.0, 0.0] {
            let mut clock = Clock::new(&ClockConfig { max_dt });
            clock.advance(0.0);
            assert!((clock.advance(5.0) - 0.1).abs() < f32::EPSILON);
        }
    }
}
