//! Dataset-wide embedding parameters.

use super::EmbeddingParameters;
use crate::error::{EntropyError, Result};
use crate::stats::rounded_median;
use serde::Serialize;

/// One (m, τ) shared by every file of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalEmbeddingParameters {
    pub params: EmbeddingParameters,
    /// Files that contributed an estimate
    pub n_estimates: usize,
    /// Files in the dataset
    pub n_files: usize,
}

/// Combine per-file estimates into the rounded medians of m and τ.
///
/// Medians are rounded half to even. `n_files` is the dataset size and is only
/// used for reporting; an empty `estimates` slice is an error.
pub fn aggregate_parameters(
    estimates: &[EmbeddingParameters],
    n_files: usize,
) -> Result<GlobalEmbeddingParameters> {
    let dims: Vec<usize> = estimates.iter().map(|p| p.dimension).collect();
    let delays: Vec<usize> = estimates.iter().map(|p| p.delay).collect();

    let (Some(dimension), Some(delay)) = (rounded_median(&dims), rounded_median(&delays)) else {
        return Err(EntropyError::NoValidEstimates { files: n_files });
    };

    Ok(GlobalEmbeddingParameters {
        params: EmbeddingParameters::new(dimension, delay),
        n_estimates: estimates.len(),
        n_files,
    })
}
