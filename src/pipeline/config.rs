//! Pipeline configuration.

use crate::clustering::{KMeansConfig, DEFAULT_MAX_ALPHABET};
use crate::embedding::delay::{DEFAULT_BINS, DEFAULT_MAX_DELAY};
use crate::embedding::dimension::{DEFAULT_MAX_DIMENSION, DEFAULT_THRESHOLD, DEFAULT_TOLERANCE};
use crate::entropy::permutation::{DEFAULT_DELAY, DEFAULT_ORDER, MAX_ORDER};
use crate::entropy::symbolic::DEFAULT_WORD_LENGTH;
use crate::error::{EntropyError, Result};
use crate::stats::Alternative;
use serde::{Deserialize, Serialize};

/// Settings for every stage of the complexity pipeline.
///
/// `Default` reproduces the study constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest delay scanned by the AMI search
    pub max_delay: usize,
    /// Histogram bins per axis for mutual information
    pub ami_bins: usize,
    /// Largest embedding dimension scanned by FNN
    pub max_dimension: usize,
    /// Distance ratio above which a neighbour counts as false
    pub fnn_tolerance: f64,
    /// FNN fraction below which a dimension is accepted
    pub fnn_threshold: f64,
    /// Largest alphabet size considered by the elbow search
    pub max_alphabet: usize,
    /// k-means restarts per clustering call
    pub kmeans_restarts: usize,
    pub kmeans_max_iter: usize,
    pub kmeans_tolerance: f64,
    /// Symbols per word in symbolic entropy
    pub word_length: usize,
    pub permutation_order: usize,
    pub permutation_delay: usize,
    /// Significance level of the group comparison
    pub alpha: f64,
    pub alternative: Alternative,
    /// Base seed; subject i of a dataset clusters with `seed + i`
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_delay: DEFAULT_MAX_DELAY,
            ami_bins: DEFAULT_BINS,
            max_dimension: DEFAULT_MAX_DIMENSION,
            fnn_tolerance: DEFAULT_TOLERANCE,
            fnn_threshold: DEFAULT_THRESHOLD,
            max_alphabet: DEFAULT_MAX_ALPHABET,
            kmeans_restarts: 10,
            kmeans_max_iter: 300,
            kmeans_tolerance: 1e-4,
            word_length: DEFAULT_WORD_LENGTH,
            permutation_order: DEFAULT_ORDER,
            permutation_delay: DEFAULT_DELAY,
            alpha: 0.05,
            alternative: Alternative::TwoSided,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Set the largest delay scanned.
    pub fn max_delay(mut self, max_delay: usize) -> Self {
        self.max_delay = max_delay.max(1);
        self
    }

    /// Set the number of AMI histogram bins.
    pub fn ami_bins(mut self, bins: usize) -> Self {
        self.ami_bins = bins.max(2);
        self
    }

    /// Set the largest embedding dimension scanned.
    pub fn max_dimension(mut self, max_dimension: usize) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    /// Set the FNN distance-ratio tolerance and acceptance threshold.
    pub fn fnn(mut self, tolerance: f64, threshold: f64) -> Self {
        self.fnn_tolerance = tolerance;
        self.fnn_threshold = threshold;
        self
    }

    /// Set the largest alphabet size considered.
    pub fn max_alphabet(mut self, max_alphabet: usize) -> Self {
        self.max_alphabet = max_alphabet;
        self
    }

    /// Set the number of k-means restarts.
    pub fn kmeans_restarts(mut self, restarts: usize) -> Self {
        self.kmeans_restarts = restarts.max(1);
        self
    }

    pub fn word_length(mut self, word_length: usize) -> Self {
        self.word_length = word_length;
        self
    }

    /// Set the ordinal-pattern order and delay.
    pub fn permutation(mut self, order: usize, delay: usize) -> Self {
        self.permutation_order = order;
        self.permutation_delay = delay;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Clustering settings shared by the elbow search and the encoder.
    pub fn kmeans_config(&self) -> KMeansConfig {
        KMeansConfig::default()
            .n_init(self.kmeans_restarts)
            .max_iter(self.kmeans_max_iter)
            .tolerance(self.kmeans_tolerance)
    }

    /// Seed used for the subject at `index` within a dataset.
    pub fn subject_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }

    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_delay == 0 || self.max_dimension == 0 {
            return Err(EntropyError::InvalidParameter(format!(
                "max delay and max dimension must be positive, got {} and {}",
                self.max_delay, self.max_dimension
            )));
        }
        if self.ami_bins < 2 {
            return Err(EntropyError::InvalidParameter(format!(
                "AMI needs at least 2 bins, got {}",
                self.ami_bins
            )));
        }
        if !(2..=MAX_ORDER).contains(&self.permutation_order) {
            return Err(EntropyError::InvalidParameter(format!(
                "permutation order must lie in 2..={MAX_ORDER}, got {}",
                self.permutation_order
            )));
        }
        if self.word_length == 0 {
            return Err(EntropyError::InvalidParameter(
                "word length must be positive".to_string(),
            ));
        }
        if self.max_alphabet < 2 {
            return Err(EntropyError::InvalidParameter(format!(
                "max alphabet must be at least 2, got {}",
                self.max_alphabet
            )));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(EntropyError::InvalidParameter(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.permutation_delay == 0 {
            return Err(EntropyError::InvalidParameter(
                "permutation delay must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
