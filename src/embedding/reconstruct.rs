//! Delay-coordinate (phase-space) reconstruction.

use crate::error::{EntropyError, Result};

/// Number of embedded vectors a signal of length `len` yields.
pub fn embedded_len(len: usize, dimension: usize, delay: usize) -> usize {
    if dimension == 0 || delay == 0 {
        return 0;
    }
    len.saturating_sub((dimension - 1) * delay)
}

/// Build `v_i = (x_i, x_{i+τ}, …, x_{i+(m-1)τ})` for every valid start index.
///
/// Returns an empty set when the signal is too short.
pub fn reconstruct(signal: &[f64], dimension: usize, delay: usize) -> Vec<Vec<f64>> {
    let count = embedded_len(signal.len(), dimension, delay);
    (0..count)
        .map(|i| delay_vector(signal, i, dimension, delay))
        .collect()
}

/// Build only the vectors starting at `indices`, in the given order.
pub fn reconstruct_at(
    signal: &[f64],
    dimension: usize,
    delay: usize,
    indices: &[usize],
) -> Result<Vec<Vec<f64>>> {
    let count = embedded_len(signal.len(), dimension, delay);
    indices
        .iter()
        .map(|&i| {
            if i >= count {
                Err(EntropyError::IndexOutOfBounds {
                    index: i,
                    size: count,
                })
            } else {
                Ok(delay_vector(signal, i, dimension, delay))
            }
        })
        .collect()
}

fn delay_vector(signal: &[f64], start: usize, dimension: usize, delay: usize) -> Vec<f64> {
    (0..dimension).map(|k| signal[start + k * delay]).collect()
}
