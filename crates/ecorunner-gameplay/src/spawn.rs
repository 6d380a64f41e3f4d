//! Periodic obstacle and power-up spawning.
//!
//! Each kind has its own accumulator. Overshoot carries into the next period,
//! so the number of spawns over a stretch of time does not depend on how that
//! time was split into ticks.

use ecorunner_common::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{SpawnConfig, SpawnKindConfig};
use crate::entity::SpawnKind;
use crate::random::RandomSource;

/// Data handed to the movement collaborator for a new entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Obstacle or power-up.
    pub kind: SpawnKind,
    /// Starting centre, just past the right edge of the play field.
    pub position: Vec2,
    /// Entity size.
    pub size: Vec2,
    /// Seconds to cross the play field.
    pub travel_duration: f32,
}

impl SpawnRequest {
    /// Constant horizontal velocity that carries the entity from its spawn
    /// point to one width past the left edge in `travel_duration`.
    #[must_use]
    pub fn velocity_x(&self, field_width: f32) -> f32 {
        -(field_width + self.size.x * 2.0) / self.travel_duration
    }
}

/// Accumulator for one spawn kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Accumulated time since the last spawn.
    elapsed: f64,
    /// Seconds between spawns.
    period: f64,
    /// Spawns fired so far.
    fired: u64,
}

impl SpawnTimer {
    /// Create an empty timer.
    #[must_use]
    pub fn new(period: f32) -> Self {
        Self {
            elapsed: 0.0,
            period: f64::from(period),
            fired: 0,
        }
    }

    /// Add `dt` and return how many periods completed.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.elapsed += f64::from(dt.max(0.0));
        let mut completed = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            completed += 1;
        }
        self.fired += u64::from(completed);
        completed
    }

    /// Time accumulated towards the next spawn.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total spawns fired.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

/// Emits spawn requests on two independent periodic timers.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    /// Obstacle timer
    obstacle_timer: SpawnTimer,
    /// Power-up timer
    power_up_timer: SpawnTimer,
    /// Placement settings
    config: SpawnConfig,
    /// Width of the play field
    field_width: f32,
}

impl SpawnScheduler {
    /// Create a scheduler with both timers at zero.
    #[must_use]
    pub fn new(config: SpawnConfig, field_width: f32) -> Self {
        Self {
            obstacle_timer: SpawnTimer::new(config.obstacle.period),
            power_up_timer: SpawnTimer::new(config.power_up.period),
            config,
            field_width,
        }
    }

    /// Obstacle accumulator.
    #[must_use]
    pub fn obstacle_timer(&self) -> &SpawnTimer {
        &self.obstacle_timer
    }

    /// Power-up accumulator.
    #[must_use]
    pub fn power_up_timer(&self) -> &SpawnTimer {
        &self.power_up_timer
    }

    /// Advance both timers and return the requests that became due,
    /// obstacles first.
    pub fn update(&mut self, dt: f32, rng: &mut dyn RandomSource) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();

        for _ in 0..self.obstacle_timer.advance(dt) {
            requests.push(self.request(SpawnKind::Obstacle, rng));
        }
        for _ in 0..self.power_up_timer.advance(dt) {
            requests.push(self.request(SpawnKind::PowerUp, rng));
        }

        requests
    }

    fn request(&self, kind: SpawnKind, rng: &mut dyn RandomSource) -> SpawnRequest {
        let settings: &SpawnKindConfig = match kind {
            SpawnKind::Obstacle => &self.config.obstacle,
            SpawnKind::PowerUp => &self.config.power_up,
        };
        let size = Vec2::new(settings.size.0, settings.size.1);
        let (low, high) = settings.height_band;
        let y = if high > low {
            rng.range_f32(low, high)
        } else {
            low
        };

        let request = SpawnRequest {
            kind,
            position: Vec2::new(self.field_width + size.x, y),
            size,
            travel_duration: settings.travel_duration,
        };
        debug!(kind = kind.display_name(), y, "spawn due");
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    fn scheduler() -> SpawnScheduler {
        SpawnScheduler::new(SpawnConfig::default(), 800.0)
    }

    #[test]
    fn test_obstacle_fires_once_with_residual() {
        let mut spawner = scheduler();
        let mut rng = ScriptedRandom::new(vec![0]);

        assert!(spawner.update(0.7, &mut rng).is_empty());
        assert!(spawner.update(0.7, &mut rng).is_empty());
        let requests = spawner.update(0.7, &mut rng);

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, SpawnKind::Obstacle);
        assert!((spawner.obstacle_timer().elapsed() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_placement() {
        let mut spawner = scheduler();
        let mut rng = ScriptedRandom::new(vec![0]);

        let requests = spawner.update(2.0, &mut rng);
        let obstacle = requests[0];
        assert_eq!(obstacle.position, Vec2::new(850.0, 110.0));
        assert_eq!(obstacle.size, Vec2::splat(50.0));
        assert!((obstacle.travel_duration - 4.0).abs() < f32::EPSILON);
        assert!((obstacle.velocity_x(800.0) + 225.0).abs() < 1e-4);
    }

    #[test]
    fn test_power_up_in_band() {
        let mut spawner = scheduler();
        let mut rng = SeededRandom::new(3);

        let mut power_ups = Vec::new();
        for _ in 0..200 {
            power_ups.extend(
                spawner
                    .update(0.5, &mut rng)
                    .into_iter()
                    .filter(|r| r.kind == SpawnKind::PowerUp),
            );
        }

        assert_eq!(power_ups.len(), 20);
        for request in power_ups {
            assert!((150.0..=300.0).contains(&request.position.y));
            assert!((request.travel_duration - 6.0).abs() < f32::EPSILON);
            assert!((request.position.x - 840.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_large_dt_fires_every_period() {
        let mut spawner = scheduler();
        let mut rng = ScriptedRandom::new(vec![0]);

        let requests = spawner.update(10.0, &mut rng);
        let obstacles = requests.iter().filter(|r| r.kind == SpawnKind::Obstacle).count();
        let power_ups = requests.iter().filter(|r| r.kind == SpawnKind::PowerUp).count();
        assert_eq!(obstacles, 5);
        assert_eq!(power_ups, 2);
    }

    proptest! {
        #[test]
        fn prop_fire_count_independent_of_tick_split(
            millis in proptest::collection::vec(1u32..700, 1..200)
        ) {
            let period = 2.0_f64;
            let dts: Vec<f32> = millis.iter().map(|ms| *ms as f32 / 1000.0).collect();
            let total: f64 = dts.iter().map(|dt| f64::from(*dt)).sum();
            let ratio = total / period;
            prop_assume!((ratio - ratio.round()).abs() > 1e-9);

            let mut timer = SpawnTimer::new(period as f32);
            for dt in &dts {
                timer.advance(*dt);
            }
            prop_assert_eq!(timer.fired(), ratio.floor() as u64);
        }
    }
}
