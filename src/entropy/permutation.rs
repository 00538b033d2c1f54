//! Normalized permutation entropy.
//!
//! Windows of `order` samples spaced `delay` apart are reduced to their
//! ordinal pattern, each pattern is indexed with its Lehmer code, and the
//! Shannon entropy of the pattern histogram is divided by log2(order!).

use super::shannon_entropy;
use crate::error::{EntropyError, Result};
use std::collections::HashMap;

/// Pattern length used by the study.
pub const DEFAULT_ORDER: usize = 4;

/// Spacing between window samples used by the study.
pub const DEFAULT_DELAY: usize = 1;

/// Largest order whose factorial fits in a `u64`.
pub const MAX_ORDER: usize = 20;

/// Stable argsort of `window`: indices in ascending value order, equal values
/// keeping their original order.
pub fn ordinal_pattern(window: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..window.len()).collect();
    // sort_by is stable, so ties keep index order
    idx.sort_by(|&i, &j| window[i].total_cmp(&window[j]));
    idx
}

/// Lehmer code (factorial number system rank) of a permutation of 0..n.
pub fn lehmer_code(perm: &[usize]) -> u64 {
    let n = perm.len();
    let mut code: u64 = 0;
    for i in 0..n {
        let smaller_after = perm[i + 1..].iter().filter(|&&p| p < perm[i]).count() as u64;
        code = code * (n - i) as u64 + smaller_after;
    }
    code
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).product()
}

/// Histogram of Lehmer-coded ordinal patterns, keyed by code.
pub fn pattern_counts(series: &[f64], order: usize, delay: usize) -> HashMap<u64, usize> {
    let mut counts = HashMap::new();
    if order == 0 || delay == 0 {
        return counts;
    }
    let span = (order - 1) * delay;
    if series.len() <= span {
        return counts;
    }

    let mut window = vec![0.0; order];
    for start in 0..series.len() - span {
        for (k, w) in window.iter_mut().enumerate() {
            *w = series[start + k * delay];
        }
        let code = lehmer_code(&ordinal_pattern(&window));
        *counts.entry(code).or_insert(0) += 1;
    }
    counts
}

/// Permutation entropy of `series` normalized to [0, 1].
///
/// Returns 0 when the series is too short for a single window.
pub fn permutation_entropy(series: &[f64], order: usize, delay: usize) -> Result<f64> {
    if !(2..=MAX_ORDER).contains(&order) {
        return Err(EntropyError::InvalidParameter(format!(
            "permutation order must lie in 2..={MAX_ORDER}, got {order}"
        )));
    }
    if delay == 0 {
        return Err(EntropyError::InvalidParameter(
            "permutation delay must be positive".to_string(),
        ));
    }

    let counts = pattern_counts(series, order, delay);
    if counts.is_empty() {
        return Ok(0.0);
    }

    let h = shannon_entropy(counts.values().copied());
    let max_entropy = (factorial(order) as f64).log2();
    Ok((h / max_entropy).clamp(0.0, 1.0))
}
