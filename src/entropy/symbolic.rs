//! Symbolic entropy of a clustered phase-space trajectory.
//!
//! Embedded vectors are clustered into an alphabet of symbols, the label
//! sequence is read as overlapping words of fixed length, and the Shannon
//! entropy of the word histogram is reported in bits.

use super::shannon_entropy;
use crate::clustering::{kmeans, KMeansConfig};
use crate::error::{EntropyError, Result};
use rand::Rng;
use std::collections::BTreeMap;

/// Word length used by the study.
pub const DEFAULT_WORD_LENGTH: usize = 3;

/// Empirical distribution of symbol words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDistribution {
    counts: BTreeMap<Vec<usize>, usize>,
    total: usize,
}

impl WordDistribution {
    /// Number of occurrences of `word`.
    pub fn count(&self, word: &[usize]) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Empirical probability of `word`.
    pub fn probability(&self, word: &[usize]) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(word) as f64 / self.total as f64
    }

    /// Number of distinct words observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of word positions.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Shannon entropy of the distribution in bits.
    pub fn entropy(&self) -> f64 {
        shannon_entropy(self.counts.values().copied())
    }
}

/// Count every run of `word_length` consecutive symbols (stride 1).
pub fn word_distribution(symbols: &[usize], word_length: usize) -> WordDistribution {
    let mut counts = BTreeMap::new();
    if word_length > 0 {
        for word in symbols.windows(word_length) {
            *counts.entry(word.to_vec()).or_insert(0) += 1;
        }
    }
    let total = counts.values().sum();
    WordDistribution { counts, total }
}

/// Entropy (bits) of the word distribution of a symbol sequence.
///
/// NaN when the sequence is shorter than one word.
pub fn word_entropy(symbols: &[usize], word_length: usize) -> f64 {
    if word_length == 0 || symbols.len() < word_length {
        return f64::NAN;
    }
    word_distribution(symbols, word_length).entropy()
}

/// Symbolic entropy of one embedded trajectory.
#[derive(Debug, Clone)]
pub struct SymbolicEntropy {
    /// Entropy of the word distribution in bits
    pub entropy: f64,
    /// Cluster label of every embedded vector
    pub symbols: Vec<usize>,
    pub alphabet_size: usize,
    /// Within-cluster sum of squares of the final clustering
    pub wcss: f64,
}

/// Cluster `points` into `alphabet_size` symbols and compute the entropy of
/// their length-`word_length` words.
///
/// Fails with `InsufficientData` when there are fewer points than
/// `max(word_length, alphabet_size)`.
pub fn symbolic_entropy<R: Rng>(
    points: &[Vec<f64>],
    alphabet_size: usize,
    word_length: usize,
    base: &KMeansConfig,
    rng: &mut R,
) -> Result<SymbolicEntropy> {
    if word_length == 0 {
        return Err(EntropyError::InvalidParameter(
            "word length must be positive".to_string(),
        ));
    }
    let needed = word_length.max(alphabet_size);
    if points.len() < needed {
        return Err(EntropyError::InsufficientData {
            needed,
            got: points.len(),
        });
    }

    let clustering = kmeans(points, &base.clone().k(alphabet_size), rng)?;
    let entropy = word_entropy(&clustering.labels, word_length);

    Ok(SymbolicEntropy {
        entropy,
        symbols: clustering.labels,
        alphabet_size,
        wcss: clustering.inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn words_overlap_by_two() {
        let dist = word_distribution(&[0, 1, 0, 1, 0], 3);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.count(&[0, 1, 0]), 2);
        assert_eq!(dist.count(&[1, 0, 1]), 1);
        assert_eq!(dist.distinct(), 2);
        assert_relative_eq!(dist.probability(&[0, 1, 0]), 2.0 / 3.0);
    }

    #[test]
    fn single_word_type_is_zero() {
        assert_eq!(word_entropy(&[2, 2, 2, 2, 2], 3), 0.0);
    }

    #[test]
    fn entropy_of_known_distribution() {
        // Words: 001, 011, 110, 100 -> four equiprobable words, 2 bits
        let h = word_entropy(&[0, 0, 1, 1, 0, 0], 3);
        assert_relative_eq!(h, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn relabelling_does_not_change_entropy() {
        let symbols = vec![0, 1, 2, 2, 1, 0, 0, 2, 1, 1, 2, 0, 1];
        let relabelled: Vec<usize> = symbols.iter().map(|&s| [5, 3, 9][s]).collect();
        assert_relative_eq!(word_entropy(&symbols, 3), word_entropy(&relabelled, 3));
    }

    #[test]
    fn short_sequence_is_nan() {
        assert!(word_entropy(&[0, 1], 3).is_nan());
    }

    #[test]
    fn symbolic_entropy_of_two_states() {
        // Trajectory alternating between two far-apart points: labels
        // alternate, leaving two word types.
        let points: Vec<Vec<f64>> = (0..40)
            .map(|i| if i % 2 == 0 { vec![0.0, 0.0] } else { vec![5.0, 5.0] })
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let result = symbolic_entropy(&points, 2, 3, &KMeansConfig::default(), &mut rng).unwrap();

        assert_eq!(result.alphabet_size, 2);
        assert_eq!(result.symbols.len(), 40);
        assert_relative_eq!(result.entropy, 1.0, epsilon = 0.01);
        assert_relative_eq!(result.wcss, 0.0);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let points = vec![vec![0.0], vec![1.0], vec![2.0]];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            symbolic_entropy(&points, 4, 3, &KMeansConfig::default(), &mut rng).unwrap_err(),
            EntropyError::InsufficientData { needed: 4, got: 3 }
        );
    }
}
