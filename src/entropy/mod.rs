//! Information-theoretic complexity measures.
//!
//! # Example
//!
//! ```
//! use gait_entropy::entropy::permutation_entropy;
//!
//! // Monotonic: every window has the same ordinal pattern
//! let series: Vec<f64> = (0..20).map(|i| i as f64).collect();
//! assert_eq!(permutation_entropy(&series, 4, 1).unwrap(), 0.0);
//! ```

pub mod permutation;
pub mod symbolic;

pub use permutation::{lehmer_code, ordinal_pattern, permutation_entropy, pattern_counts};
pub use symbolic::{symbolic_entropy, word_distribution, word_entropy, SymbolicEntropy, WordDistribution};

/// Shannon entropy in bits of the distribution given by `counts`.
///
/// Zero counts are ignored. An empty or all-zero histogram has entropy 0.
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
    I::IntoIter: Clone,
{
    let iter = counts.into_iter();
    let total: usize = iter.clone().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;

    let h: f64 = iter
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    // A single outcome yields -0.0
    h.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shannon_uniform() {
        assert_relative_eq!(shannon_entropy(vec![5, 5, 5, 5]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn shannon_single_outcome_is_zero() {
        let h = shannon_entropy(vec![7]);
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());
    }

    #[test]
    fn shannon_ignores_zero_counts() {
        assert_relative_eq!(shannon_entropy(vec![0, 3, 0, 3]), 1.0, epsilon = 1e-12);
        assert_eq!(shannon_entropy(Vec::<usize>::new()), 0.0);
    }
}
