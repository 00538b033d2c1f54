//! Embedding-parameter estimation and phase-space reconstruction.
//!
//! # Example
//!
//! ```
//! use gait_entropy::embedding::{estimate_delay, estimate_dimension, reconstruct};
//!
//! let signal: Vec<f64> = (0..300).map(|i| (i as f64 * 0.2).sin()).collect();
//! let tau = estimate_delay(&signal, 50, 32).value();
//! let m = estimate_dimension(&signal, tau, 15, 15.0, 0.05).unwrap().value();
//! let vectors = reconstruct(&signal, m, tau);
//! assert_eq!(vectors.len(), signal.len() - (m - 1) * tau);
//! ```

pub mod delay;
pub mod dimension;
pub mod global;
pub mod reconstruct;

pub use delay::{ami_curve, average_mutual_information, estimate_delay, first_local_minimum};
pub use dimension::{estimate_dimension, false_nearest_fraction, MIN_DIMENSION};
pub use global::{aggregate_parameters, GlobalEmbeddingParameters};
pub use reconstruct::{embedded_len, reconstruct, reconstruct_at};

use serde::Serialize;

/// Embedding dimension m and delay τ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EmbeddingParameters {
    pub dimension: usize,
    pub delay: usize,
}

impl EmbeddingParameters {
    /// Create parameters, clamping to m ≥ 2 and τ ≥ 1.
    pub fn new(dimension: usize, delay: usize) -> Self {
        Self {
            dimension: dimension.max(MIN_DIMENSION),
            delay: delay.max(1),
        }
    }

    /// Delay vectors of `signal` under these parameters.
    pub fn embed(&self, signal: &[f64]) -> Vec<Vec<f64>> {
        reconstruct(signal, self.dimension, self.delay)
    }

    /// Number of vectors a signal of length `len` yields.
    pub fn vector_count(&self, len: usize) -> usize {
        embedded_len(len, self.dimension, self.delay)
    }
}
