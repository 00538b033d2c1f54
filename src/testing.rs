//! Shared fixtures for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` samples of uniform noise on [0, 1), reproducible for a seed.
pub(crate) fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen::<f64>()).collect()
}
