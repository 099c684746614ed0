//! Confidence jitter for the rule-based classifiers.
//!
//! Rule classifiers have no real probability to report, so each rule carries
//! a base confidence plus a bounded random spread. The generator is seedable
//! so classification runs can be reproduced exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of bounded confidence noise.
#[derive(Debug)]
pub enum Jitter {
    /// No noise: every sample returns the base value.
    Fixed,
    /// Uniform noise in `[0, spread)` drawn from a seeded generator.
    Random(StdRng),
}

impl Jitter {
    pub fn fixed() -> Self {
        Jitter::Fixed
    }

    pub fn seeded(seed: u64) -> Self {
        Jitter::Random(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Jitter::Random(StdRng::from_entropy())
    }

    /// Builds a generator from an optional seed, falling back to OS entropy.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Returns `base + u` where `u` is uniform in `[0, spread)`.
    pub fn sample(&mut self, base: f32, spread: f32) -> f32 {
        match self {
            Jitter::Fixed => base,
            Jitter::Random(rng) if spread > 0.0 => base + rng.gen_range(0.0..spread),
            Jitter::Random(_) => base,
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}
