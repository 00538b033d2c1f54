//! Z-score normalization for raw channels.

use crate::error::{EntropyError, Result};

/// Variance below this is treated as a constant signal.
const MIN_VARIANCE: f64 = 1e-20;

/// Result of a scaling transform, containing parameters for inverse transform.
#[derive(Debug, Clone)]
pub struct ScaleResult {
    /// Transformed data
    pub data: Vec<f64>,
    /// Mean of the original signal
    pub center: f64,
    /// Population standard deviation of the original signal
    pub scale: f64,
}

impl ScaleResult {
    /// Inverse transform to recover original scale.
    pub fn inverse(&self) -> Vec<f64> {
        self.data
            .iter()
            .map(|&x| x * self.scale + self.center)
            .collect()
    }
}

/// Standardize data to zero mean and unit variance.
///
/// x_scaled = (x - mean) / std, where std uses the population divisor N.
///
/// Fails on empty input, non-finite samples and zero-variance signals; the
/// signal itself is left untouched.
pub fn standardize(series: &[f64]) -> Result<ScaleResult> {
    if series.is_empty() {
        return Err(EntropyError::EmptyData);
    }
    if let Some(index) = series.iter().position(|x| !x.is_finite()) {
        return Err(EntropyError::NonFinite { index });
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    if variance < MIN_VARIANCE {
        return Err(EntropyError::ZeroVariance);
    }

    let std = variance.sqrt();
    let data = series.iter().map(|&x| (x - mean) / std).collect();

    Ok(ScaleResult {
        data,
        center: mean,
        scale: std,
    })
}
