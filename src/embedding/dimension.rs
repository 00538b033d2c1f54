//! Embedding-dimension selection from the false-nearest-neighbour fraction.

use super::reconstruct::{embedded_len, reconstruct, reconstruct_at};
use crate::core::{DegenerateInput, Estimate};
use crate::error::Result;
use rayon::prelude::*;

/// Upper limit on the dimension search.
pub const DEFAULT_MAX_DIMENSION: usize = 15;

/// Distance growth ratio above which a neighbour is considered false.
pub const DEFAULT_TOLERANCE: f64 = 15.0;

/// False fraction below which a dimension is accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.05;

/// Smallest dimension ever reported.
pub const MIN_DIMENSION: usize = 2;

/// Query vectors are built this many at a time.
const QUERY_CHUNK: usize = 256;

/// Fraction of false nearest neighbours at `dimension`.
///
/// Only points whose coordinate at `dimension + 1` exists take part. Returns
/// `Ok(None)` when fewer than two such points exist.
pub fn false_nearest_fraction(
    signal: &[f64],
    dimension: usize,
    delay: usize,
    tolerance: f64,
) -> Result<Option<f64>> {
    if dimension == 0 || delay == 0 {
        return Ok(None);
    }
    let Some(n_points) = signal.len().checked_sub(dimension * delay) else {
        return Ok(None);
    };
    if n_points < 2 {
        return Ok(None);
    }

    // Truncate so the reference set holds exactly the extendable points.
    let usable = &signal[..n_points + (dimension - 1) * delay];
    debug_assert_eq!(embedded_len(usable.len(), dimension, delay), n_points);
    let reference = reconstruct(usable, dimension, delay);
    let extension = dimension * delay;

    let indices: Vec<usize> = (0..n_points).collect();
    let false_count: usize = indices
        .par_chunks(QUERY_CHUNK)
        .map(|chunk| -> Result<usize> {
            let queries = reconstruct_at(usable, dimension, delay, chunk)?;
            Ok(chunk
                .iter()
                .zip(queries.iter())
                .filter(|&(&i, query)| {
                    let (j, dist_sq) = nearest_neighbour(query, i, &reference);
                    let grown = (signal[i + extension] - signal[j + extension]).abs();
                    is_false_neighbour(dist_sq.sqrt(), grown, tolerance)
                })
                .count())
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    Ok(Some(false_count as f64 / n_points as f64))
}

/// Brute-force nearest neighbour of `query` (which is `reference[skip]`),
/// returning its index and squared distance. Ties go to the lowest index.
fn nearest_neighbour(query: &[f64], skip: usize, reference: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (usize::MAX, f64::INFINITY);
    for (j, candidate) in reference.iter().enumerate() {
        if j == skip {
            continue;
        }
        let d: f64 = query
            .iter()
            .zip(candidate.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        if d < best.1 {
            best = (j, d);
        }
    }
    best
}

fn is_false_neighbour(distance: f64, grown: f64, tolerance: f64) -> bool {
    if distance == 0.0 {
        grown > 0.0
    } else {
        grown / distance > tolerance
    }
}

/// Select the embedding dimension for `signal` at a given delay.
///
/// Scans m = 1..=min(max_dimension, n/τ - 1) and returns the first m whose
/// false fraction is below `threshold`, else the m with the lowest fraction.
/// The result is never below [`MIN_DIMENSION`].
pub fn estimate_dimension(
    signal: &[f64],
    delay: usize,
    max_dimension: usize,
    tolerance: f64,
    threshold: f64,
) -> Result<Estimate<usize>> {
    let delay = delay.max(1);
    let max_m = max_dimension.min((signal.len() / delay).saturating_sub(1));

    let mut fractions = Vec::with_capacity(max_m);
    for m in 1..=max_m {
        let Some(fraction) = false_nearest_fraction(signal, m, delay, tolerance)? else {
            break;
        };
        if fraction < threshold {
            return Ok(Estimate::Computed(m.max(MIN_DIMENSION)));
        }
        fractions.push(fraction);
    }

    if fractions.is_empty() {
        return Ok(Estimate::Fallback {
            value: MIN_DIMENSION,
            reason: DegenerateInput::TooShort { len: signal.len() },
        });
    }

    let best = fractions
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(bi, bv), (i, &v)| {
            if v < bv {
                (i, v)
            } else {
                (bi, bv)
            }
        })
        .0;

    Ok(Estimate::Fallback {
        value: (best + 1).max(MIN_DIMENSION),
        reason: DegenerateInput::ThresholdNeverCrossed,
    })
}
