//! Seeded randomness port
//!
//! The spawner only ever asks for uniform floats in a closed range, so that is
//! the whole trait.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform random floats
pub trait RandomSource {
    /// Uniform sample in `[lo, hi]`
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32;
}

/// PCG-backed deterministic RNG
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: Pcg32,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }
}
