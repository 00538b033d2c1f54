//! Alphabet-size selection by the WCSS elbow.
//!
//! Each candidate cluster count is scored by its within-cluster sum of
//! squares. After scaling both axes to [0, 1], the elbow is the candidate
//! farthest from the chord joining the first and last points of the curve.

use super::kmeans::{kmeans, KMeansConfig};
use crate::core::{DegenerateInput, Estimate};
use crate::stats::rounded_median;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Smallest alphabet considered.
pub const MIN_ALPHABET: usize = 2;

/// Upper limit on the alphabet size used by the study.
pub const DEFAULT_MAX_ALPHABET: usize = 15;

/// Distances below this count as a straight curve.
const FLAT_EPS: f64 = 1e-9;

/// Selected alphabet size along with the curve it was chosen from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlphabetSelection {
    pub alphabet_size: Estimate<usize>,
    /// Candidate cluster counts in increasing order
    pub candidates: Vec<usize>,
    /// WCSS per candidate; `None` where clustering failed
    pub wcss: Vec<Option<f64>>,
}

/// Cluster counts 2..=min(max_alphabet, n_vectors / 2).
pub fn candidate_sizes(n_vectors: usize, max_alphabet: usize) -> Vec<usize> {
    (MIN_ALPHABET..=max_alphabet.min(n_vectors / 2)).collect()
}

/// WCSS for every candidate; a candidate whose clustering fails maps to `None`.
pub fn wcss_curve<R: Rng>(
    points: &[Vec<f64>],
    candidates: &[usize],
    base: &KMeansConfig,
    rng: &mut R,
) -> Vec<Option<f64>> {
    candidates
        .iter()
        .map(|&c| match kmeans(points, &base.clone().k(c), rng) {
            Ok(result) => Some(result.inertia),
            Err(err) => {
                debug!(clusters = c, error = %err, "excluding cluster count from WCSS curve");
                None
            }
        })
        .collect()
}

/// Pick the elbow of a (candidate, WCSS) curve.
///
/// Falls back to the median candidate when fewer than two WCSS values are
/// valid, or when the valid curve is flat or a straight line.
pub fn select_elbow(candidates: &[usize], wcss: &[Option<f64>]) -> Estimate<usize> {
    let fallback = |reason| Estimate::Fallback {
        value: rounded_median(candidates).unwrap_or(MIN_ALPHABET),
        reason,
    };

    let valid: Vec<(f64, f64)> = candidates
        .iter()
        .zip(wcss.iter())
        .filter_map(|(&c, w)| w.filter(|v| v.is_finite()).map(|v| (c as f64, v)))
        .collect();

    if valid.len() < 2 {
        return fallback(DegenerateInput::TooFewCandidates { valid: valid.len() });
    }

    let (c_min, c_max) = (valid[0].0, valid[valid.len() - 1].0);
    let w_min = valid.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let w_max = valid.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if w_max - w_min <= 0.0 || c_max - c_min <= 0.0 {
        return fallback(DegenerateInput::NoElbow);
    }

    let scaled: Vec<(f64, f64)> = valid
        .iter()
        .map(|&(c, w)| ((c - c_min) / (c_max - c_min), (w - w_min) / (w_max - w_min)))
        .collect();

    let (x0, y0) = scaled[0];
    let (x1, y1) = scaled[scaled.len() - 1];
    let chord = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

    let mut best = (0, f64::NEG_INFINITY);
    for (i, &(x, y)) in scaled.iter().enumerate() {
        let d = ((y1 - y0) * x - (x1 - x0) * y + x1 * y0 - y1 * x0).abs() / chord;
        if d > best.1 {
            best = (i, d);
        }
    }

    if best.1 < FLAT_EPS {
        return fallback(DegenerateInput::NoElbow);
    }

    Estimate::Computed(valid[best.0].0 as usize)
}

/// Choose the number of symbols for a set of embedded vectors.
pub fn select_alphabet_size<R: Rng>(
    points: &[Vec<f64>],
    max_alphabet: usize,
    base: &KMeansConfig,
    rng: &mut R,
) -> AlphabetSelection {
    let candidates = candidate_sizes(points.len(), max_alphabet);
    let wcss = wcss_curve(points, &candidates, base, rng);
    let alphabet_size = select_elbow(&candidates, &wcss);

    AlphabetSelection {
        alphabet_size,
        candidates,
        wcss,
    }
}
