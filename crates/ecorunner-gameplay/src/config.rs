//! Gameplay tuning.
//!
//! Every constant the simulation depends on lives here so hosts can load
//! overrides from a file. All sections use `#[serde(default)]`, so a partial
//! file only overrides the values it names.

use serde::{Deserialize, Serialize};

use crate::environment::LayerKind;

/// Frame clock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest dt a single tick may consume, in seconds.
    pub max_dt: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_dt: 0.1 }
    }
}

/// Hero tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Upward impulse applied by a grounded jump.
    pub jump_impulse: f32,
    /// How long the special move keeps the hero invincible, in seconds.
    pub invincible_duration: f32,
    /// Length of a regular attack before returning to running.
    pub attack_duration: f32,
    /// Length of the special move attack before returning to running.
    pub special_move_duration: f32,
    /// Number of fade-out/fade-in cycles after taking damage.
    pub hit_blink_cycles: u32,
    /// Length of one blink cycle.
    pub hit_blink_interval: f32,
    /// Lifetime of the dust effect spawned on landing.
    pub landing_effect_duration: f32,
    /// Horizontal position of the hero in the play field.
    pub start_x: f32,
    /// Vertical position of the hero's centre when standing on the ground.
    pub ground_y: f32,
    /// Hero sprite size.
    pub size: (f32, f32),
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            jump_impulse: 350.0,
            invincible_duration: 1.5,
            attack_duration: 0.4,
            special_move_duration: 0.32,
            hit_blink_cycles: 5,
            hit_blink_interval: 0.2,
            landing_effect_duration: 0.3,
            start_x: 160.0,
            ground_y: 150.0,
            size: (48.0, 64.0),
        }
    }
}

impl PlayerConfig {
    /// Total time the hero spends in the hit state.
    #[must_use]
    pub fn hit_duration(&self) -> f32 {
        self.hit_blink_cycles as f32 * self.hit_blink_interval
    }
}

/// Spawn timing and placement for one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnKindConfig {
    /// Seconds between spawns.
    pub period: f32,
    /// Seconds the entity takes to cross the play field.
    pub travel_duration: f32,
    /// Entity size in scene units.
    pub size: (f32, f32),
    /// Inclusive band the spawn height is drawn from. A zero-width band
    /// gives a fixed height.
    pub height_band: (f32, f32),
}

/// Spawn scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Obstacles.
    pub obstacle: SpawnKindConfig,
    /// Power-ups.
    pub power_up: SpawnKindConfig,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            obstacle: SpawnKindConfig {
                period: 2.0,
                travel_duration: 4.0,
                size: (50.0, 50.0),
                height_band: (110.0, 110.0),
            },
            power_up: SpawnKindConfig {
                period: 5.0,
                travel_duration: 6.0,
                size: (40.0, 40.0),
                height_band: (150.0, 300.0),
            },
        }
    }
}

/// One scrolling background layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Which layer this is.
    pub kind: LayerKind,
    /// Fraction of the scroll speed this layer moves at.
    pub factor: f32,
}

/// Day/night cycle, weather and parallax settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Length of one full day/night cycle in seconds.
    pub cycle_length: f32,
    /// Horizontal scroll speed in scene units per second.
    pub scroll_speed: f32,
    /// Width of the play field (and of one background wrap).
    pub field_width: f32,
    /// Height of the play field.
    pub field_height: f32,
    /// Weather may start only below this day time.
    pub weather_start_below: f32,
    /// Weather clears above this day time.
    pub weather_clear_above: f32,
    /// Percent chance of rain per roll.
    pub rain_chance: u32,
    /// Percent chance of snow per roll.
    pub snow_chance: u32,
    /// Parallax layers, back to front.
    pub layers: Vec<LayerConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            cycle_length: 60.0,
            scroll_speed: 200.0,
            field_width: 800.0,
            field_height: 600.0,
            weather_start_below: 0.3,
            weather_clear_above: 0.5,
            rain_chance: 30,
            snow_chance: 30,
            layers: vec![
                LayerConfig {
                    kind: LayerKind::Sky,
                    factor: 0.05,
                },
                LayerConfig {
                    kind: LayerKind::Mountains,
                    factor: 0.1,
                },
                LayerConfig {
                    kind: LayerKind::Forest,
                    factor: 0.2,
                },
                LayerConfig {
                    kind: LayerKind::Foreground,
                    factor: 0.4,
                },
            ],
        }
    }
}

/// Score accrual settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Distance points per second survived.
    pub points_per_second: f32,
    /// Eco points per collected power-up.
    pub power_up_bonus: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_second: 100.0,
            power_up_bonus: 10,
        }
    }
}

/// Complete gameplay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Frame clock.
    pub clock: ClockConfig,
    /// Hero.
    pub player: PlayerConfig,
    /// Spawn scheduler.
    pub spawn: SpawnConfig,
    /// Environment cycle.
    pub environment: EnvironmentConfig,
    /// Scoring.
    pub scoring: ScoringConfig,
    /// Seed for weather rolls and spawn placement. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl GameplayConfig {
    /// Clamp every value to a range the simulation can run with.
    ///
    /// NaN and infinite values fall back to the default first.
    pub fn validate(&mut self) {
        let defaults = Self::default();

        self.clock.max_dt = finite_or(self.clock.max_dt, defaults.clock.max_dt).clamp(0.001, 1.0);

        let player = &mut self.player;
        let base = &defaults.player;
        player.jump_impulse = finite_or(player.jump_impulse, base.jump_impulse).max(0.0);
        player.invincible_duration =
            finite_or(player.invincible_duration, base.invincible_duration).max(0.0);
        player.attack_duration = finite_or(player.attack_duration, base.attack_duration).max(0.0);
        player.special_move_duration =
            finite_or(player.special_move_duration, base.special_move_duration).max(0.0);
        player.hit_blink_interval =
            finite_or(player.hit_blink_interval, base.hit_blink_interval).max(0.01);
        player.landing_effect_duration =
            finite_or(player.landing_effect_duration, base.landing_effect_duration).max(0.0);
        player.start_x = finite_or(player.start_x, base.start_x);
        player.ground_y = finite_or(player.ground_y, base.ground_y);
        player.size = finite_pair_or(player.size, base.size);

        for (kind, base) in [
            (&mut self.spawn.obstacle, &defaults.spawn.obstacle),
            (&mut self.spawn.power_up, &defaults.spawn.power_up),
        ] {
            kind.period = finite_or(kind.period, base.period).max(0.05);
            kind.travel_duration = finite_or(kind.travel_duration, base.travel_duration).max(0.05);
            kind.size = finite_pair_or(kind.size, base.size);
            kind.height_band = finite_pair_or(kind.height_band, base.height_band);
            if kind.height_band.1 < kind.height_band.0 {
                kind.height_band = (kind.height_band.1, kind.height_band.0);
            }
        }

        let env = &mut self.environment;
        let base = &defaults.environment;
        env.cycle_length = finite_or(env.cycle_length, base.cycle_length).max(1.0);
        env.scroll_speed = finite_or(env.scroll_speed, base.scroll_speed).clamp(0.0, MAX_SCROLL_SPEED);
        env.field_width = finite_or(env.field_width, base.field_width).max(1.0);
        env.field_height = finite_or(env.field_height, base.field_height).max(1.0);
        env.weather_start_below =
            finite_or(env.weather_start_below, base.weather_start_below).clamp(0.0, 1.0);
        env.weather_clear_above = finite_or(env.weather_clear_above, base.weather_clear_above)
            .clamp(env.weather_start_below, 1.0);
        env.rain_chance = env.rain_chance.min(100);
        env.snow_chance = env.snow_chance.min(100 - env.rain_chance);
        for layer in &mut env.layers {
            layer.factor = finite_or(layer.factor, 0.0).clamp(0.0, 1.0);
        }

        self.scoring.points_per_second =
            finite_or(self.scoring.points_per_second, defaults.scoring.points_per_second).max(0.0);
    }
}

/// Fastest background scroll a config may ask for, in scene units per second.
const MAX_SCROLL_SPEED: f32 = 10_000.0;

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn finite_pair_or(value: (f32, f32), fallback: (f32, f32)) -> (f32, f32) {
    (finite_or(value.0, fallback.0), finite_or(value.1, fallback.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = GameplayConfig::default();
        assert!((config.clock.max_dt - 0.1).abs() < f32::EPSILON);
        assert!((config.player.hit_duration() - 1.0).abs() < 1e-6);
        assert!((config.spawn.obstacle.period - 2.0).abs() < f32::EPSILON);
        assert!((config.spawn.power_up.period - 5.0).abs() < f32::EPSILON);
        assert_eq!(config.environment.layers.len(), 4);
        assert_eq!(config.scoring.power_up_bonus, 10);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = GameplayConfig::default();
        config.clock.max_dt = -3.0;
        config.spawn.power_up.height_band = (300.0, 150.0);
        config.environment.rain_chance = 80;
        config.environment.snow_chance = 80;
        config.validate();

        assert!(config.clock.max_dt > 0.0);
        assert_eq!(config.spawn.power_up.height_band, (150.0, 300.0));
        assert_eq!(config.environment.rain_chance + config.environment.snow_chance, 100);
    }

    #[test]
    fn test_validate_replaces_non_finite_values() {
        let mut config = GameplayConfig::default();
        config.clock.max_dt = f32::NAN;
        config.player.jump_impulse = f32::INFINITY;
        config.spawn.obstacle.period = f32::NEG_INFINITY;
        config.spawn.power_up.height_band = (f32::NAN, 280.0);
        config.environment.weather_start_below = f32::NAN;
        config.environment.weather_clear_above = f32::INFINITY;
        config.environment.scroll_speed = f32::INFINITY;
        config.environment.layers[0].factor = f32::INFINITY;
        config.environment.layers[1].factor = 25.0;
        config.scoring.points_per_second = f32::NAN;
        config.validate();

        let defaults = GameplayConfig::default();
        assert!((config.clock.max_dt - defaults.clock.max_dt).abs() < f32::EPSILON);
        assert!((config.player.jump_impulse - defaults.player.jump_impulse).abs() < f32::EPSILON);
        assert!((config.spawn.obstacle.period - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.spawn.power_up.height_band, (150.0, 280.0));
        assert!((config.environment.weather_start_below - 0.3).abs() < f32::EPSILON);
        assert!((config.environment.weather_clear_above - 0.5).abs() < f32::EPSILON);
        assert!((config.environment.scroll_speed - 200.0).abs() < f32::EPSILON);
        assert_eq!(config.environment.layers[0].factor, 0.0);
        assert!((config.environment.layers[1].factor - 1.0).abs() < f32::EPSILON);
        assert!((config.scoring.points_per_second - 100.0).abs() < f32::EPSILON);
    }
}
