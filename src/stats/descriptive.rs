//! Descriptive statistics for per-subject entropy values.

use serde::Serialize;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Standard error of the mean.
pub fn sem(values: &[f64]) -> f64 {
    std_dev(values) / (values.len() as f64).sqrt()
}

/// Calculate the median of a slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n.is_multiple_of(2) {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Quantile `q` in [0, 1] with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

/// Median of integer values rounded half to even.
///
/// `[2, 3]` gives 2 and `[3, 4]` gives 4.
pub fn rounded_median(values: &[usize]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    Some(median(&as_f64).round_ties_even() as usize)
}

/// Cohen's d with the pooled standard deviation `sqrt((var_a + var_b) / 2)`.
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let pooled = ((variance(a) + variance(b)) / 2.0).sqrt();
    if pooled == 0.0 {
        return f64::NAN;
    }
    (mean(a) - mean(b)) / pooled
}

/// Summary of one group's valid entropy values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Group label
    pub label: String,
    /// Number of valid (non-NaN) values
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Standard error of the mean
    pub sem: f64,
}

impl GroupSummary {
    /// Summarize `values`, ignoring NaN entries.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Self {
        let valid = finite_values(values);
        Self {
            label: label.into(),
            n: valid.len(),
            mean: mean(&valid),
            median: median(&valid),
            std_dev: std_dev(&valid),
            sem: sem(&valid),
        }
    }
}

/// Copy of `values` without NaN or infinite entries.
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}
