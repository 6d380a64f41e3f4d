//! Injectable random source.
//!
//! Weather rolls and power-up placement draw from a [`RandomSource`] handed to
//! the session at construction, so a fixed seed replays the exact same run.

/// Source of the two kinds of random draw the simulation makes.
pub trait RandomSource: Send {
    /// Uniform integer in `[0, bound)`. `bound` is at least 1.
    fn below(&mut self, bound: u32) -> u32;

    /// Uniform float in the inclusive range `[min, max]`.
    fn range_f32(&mut self, min: f32, max: f32) -> f32;
}

/// Seeded generator backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: fastrand::Rng,
    seed: u64,
}

impl SeededRandom {
    /// Create a generator with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            seed,
        }
    }

    /// Create a generator seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let seed = fastrand::u64(..);
        Self::new(seed)
    }

    /// The seed this generator started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: u32) -> u32 {
        self.rng.u32(..bound.max(1))
    }

    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.rng.f32() * (max - min)
    }
}

/// Replays a fixed list of integer rolls, cycling when exhausted.
///
/// Float draws return the midpoint of the requested range.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    rolls: Vec<u32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Create a source that yields `rolls` in order.
    #[must_use]
    pub fn new(rolls: Vec<u32>) -> Self {
        Self { rolls, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if self.rolls.is_empty() {
            return 0;
        }
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll % bound.max(1)
    }

    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * 0.5
    }
}
