//! Synthetic density generation.
//!
//! Densities are drawn uniformly from a closed range and rounded to two
//! decimal places, matching what the ingest API stores.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Lowest density the emitter produces.
pub const DENSITY_MIN: f64 = 2.5;

/// Highest density the emitter produces.
pub const DENSITY_MAX: f64 = 9.8;

/// Round a density to two decimal places.
pub fn round_density(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw a single density in `[DENSITY_MIN, DENSITY_MAX]` from the thread RNG.
pub fn generate_density() -> f64 {
    let mut rng = rand::thread_rng();
    round_density(rng.gen_range(DENSITY_MIN..=DENSITY_MAX))
}

/// Density source with its own RNG and bounds.
#[derive(Debug, Clone)]
pub struct DensityGenerator {
    rng: ChaCha8Rng,
    min: f64,
    max: f64,
}

impl DensityGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(min: f64, max: f64) -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy(), min, max)
    }

    /// Create a deterministic generator.
    pub fn with_seed(seed: u64, min: f64, max: f64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed), min, max)
    }

    fn from_rng(rng: ChaCha8Rng, min: f64, max: f64) -> Self {
        // gen_range panics on an inverted range
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { rng, min, max }
    }

    /// Lower and upper bound, inclusive.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Draw the next density.
    pub fn next_density(&mut self) -> f64 {
        let raw = self.rng.gen_range(self.min..=self.max);
        // Rounding can never leave the range for bounds with <= 2 decimals,
        // but user-supplied bounds may carry more.
        round_density(raw).clamp(self.min, self.max)
    }
}

impl Default for DensityGenerator {
    fn default() -> Self {
        Self::new(DENSITY_MIN, DENSITY_MAX)
    }
}
