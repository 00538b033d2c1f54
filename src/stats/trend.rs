//! Change of entropy across consecutive trials.
//!
//! Observations are tagged with the block they belong to and their trial
//! position. The trend analysis summarizes every position, pairs the first
//! and last position of each block for a paired t-test with a bootstrap
//! interval of the mean change, and fits a straight line of value against
//! position.

use super::descriptive::{mean, quantile, sem, std_dev};
use crate::error::{EntropyError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One entropy value at a trial position within a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialObservation {
    /// Identifier shared by all trials of one block of one subject
    pub block_id: String,
    /// 1-based trial position
    pub position: u32,
    pub value: f64,
}

impl TrialObservation {
    pub fn new(block_id: impl Into<String>, position: u32, value: f64) -> Self {
        Self {
            block_id: block_id.into(),
            position,
            value,
        }
    }
}

/// Settings for [`trial_trend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendConfig {
    /// Position taken as the baseline of the paired comparison
    pub first_position: u32,
    /// Position compared against the baseline
    pub last_position: u32,
    /// Fewest complete blocks for the paired comparison
    pub min_blocks: usize,
    /// Bootstrap resamples of the mean change
    pub n_resamples: usize,
    /// Coverage of the bootstrap interval
    pub level: f64,
    pub seed: u64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            first_position: 1,
            last_position: 3,
            min_blocks: 5,
            n_resamples: 5000,
            level: 0.95,
            seed: 42,
        }
    }
}

impl TrendConfig {
    /// Compare `last` against `first`.
    pub fn positions(mut self, first: u32, last: u32) -> Self {
        self.first_position = first;
        self.last_position = last;
        self
    }

    pub fn min_blocks(mut self, min_blocks: usize) -> Self {
        self.min_blocks = min_blocks.max(2);
        self
    }

    pub fn n_resamples(mut self, n_resamples: usize) -> Self {
        self.n_resamples = n_resamples.max(1);
        self
    }

    pub fn level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Statistics of all values at one trial position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub position: u32,
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    pub sem: f64,
}

/// Paired t-test of `after - before`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedTTest {
    /// Number of pairs
    pub n: usize,
    /// Positive when values grow from `before` to `after`
    pub t_statistic: f64,
    /// Two-sided p-value with n - 1 degrees of freedom
    pub p_value: f64,
    pub mean_difference: f64,
    /// Mean difference over the sample SD of the differences
    pub cohens_d: f64,
}

/// Percentile bootstrap interval of a mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    pub n_resamples: usize,
}

/// Least-squares line of `y` on `x` with its correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Pearson correlation of x and y
    pub pearson_r: f64,
    /// Two-sided p-value of the correlation, n - 2 degrees of freedom
    pub pearson_p: f64,
    pub n: usize,
}

/// Paired comparison of the first and last position over complete blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedChange {
    pub test: PairedTTest,
    pub interval: BootstrapInterval,
}

/// Full trend analysis of one set of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialTrend {
    /// One summary per observed position, ascending
    pub positions: Vec<PositionSummary>,
    /// Absent when fewer than `min_blocks` blocks hold both positions or the
    /// differences have no spread
    pub paired: Option<PairedChange>,
    /// Absent when fewer than three values or a single position was observed
    pub trend: Option<LinearTrend>,
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| EntropyError::ComputationError(format!("t distribution: {e}")))
}

/// Paired t-test on equally long `before` and `after` samples.
pub fn paired_t_test(before: &[f64], after: &[f64]) -> Result<PairedTTest> {
    if before.len() != after.len() {
        return Err(EntropyError::DimensionMismatch {
            expected: before.len(),
            got: after.len(),
        });
    }
    let n = before.len();
    if n < 2 {
        return Err(EntropyError::InsufficientData { needed: 2, got: n });
    }

    let diffs: Vec<f64> = before.iter().zip(after).map(|(b, a)| a - b).collect();
    if let Some(index) = diffs.iter().position(|d| !d.is_finite()) {
        return Err(EntropyError::NonFinite { index });
    }
    let mean_difference = mean(&diffs);
    let sd = std_dev(&diffs);
    if sd == 0.0 {
        return Err(EntropyError::ZeroVariance);
    }

    let t_statistic = mean_difference / (sd / (n as f64).sqrt());
    let p_value = 2.0 * students_t((n - 1) as f64)?.sf(t_statistic.abs());

    Ok(PairedTTest {
        n,
        t_statistic,
        p_value: p_value.min(1.0),
        mean_difference,
        cohens_d: mean_difference / sd,
    })
}

/// Percentile bootstrap interval of the mean of `values`.
///
/// Each resample draws `values.len()` indices with replacement.
pub fn bootstrap_mean_ci<R: Rng>(
    values: &[f64],
    n_resamples: usize,
    level: f64,
    rng: &mut R,
) -> Result<BootstrapInterval> {
    if values.is_empty() {
        return Err(EntropyError::EmptyData);
    }
    if n_resamples == 0 {
        return Err(EntropyError::InvalidParameter(
            "bootstrap needs at least one resample".to_string(),
        ));
    }
    if !(level > 0.0 && level < 1.0) {
        return Err(EntropyError::InvalidParameter(format!(
            "interval level must lie in (0, 1), got {level}"
        )));
    }

    let n = values.len();
    let means: Vec<f64> = (0..n_resamples)
        .map(|_| (0..n).map(|_| values[rng.gen_range(0..n)]).sum::<f64>() / n as f64)
        .collect();

    let tail = (1.0 - level) / 2.0;
    Ok(BootstrapInterval {
        lower: quantile(&means, tail),
        upper: quantile(&means, 1.0 - tail),
        level,
        n_resamples,
    })
}

/// Fit `y = intercept + slope * x` and the Pearson correlation of x and y.
pub fn linear_trend(x: &[f64], y: &[f64]) -> Result<LinearTrend> {
    if x.len() != y.len() {
        return Err(EntropyError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    let n = x.len();
    if n < 3 {
        return Err(EntropyError::InsufficientData { needed: 3, got: n });
    }

    let mx = mean(x);
    let my = mean(y);
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if !(sxx.is_finite() && syy.is_finite()) {
        return Err(EntropyError::ComputationError(
            "non-finite value in trend input".to_string(),
        ));
    }
    if sxx == 0.0 {
        return Err(EntropyError::ZeroVariance);
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    // Flat y: no correlation to speak of.
    let pearson_r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };

    let df = (n - 2) as f64;
    let pearson_p = if pearson_r.abs() == 1.0 {
        0.0
    } else {
        let t = pearson_r * (df / (1.0 - pearson_r * pearson_r)).sqrt();
        (2.0 * students_t(df)?.sf(t.abs())).min(1.0)
    };

    Ok(LinearTrend {
        slope,
        intercept,
        r_squared: pearson_r * pearson_r,
        pearson_r,
        pearson_p,
        n,
    })
}

/// Summaries of every trial position, ascending. Non-finite values are skipped.
pub fn position_summaries(observations: &[TrialObservation]) -> Vec<PositionSummary> {
    let mut by_position: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        by_position.entry(obs.position).or_default().push(obs.value);
    }
    by_position
        .into_iter()
        .map(|(position, values)| PositionSummary {
            position,
            n: values.len(),
            mean: mean(&values),
            std_dev: std_dev(&values),
            sem: sem(&values),
        })
        .collect()
}

/// First- and last-position values of every block holding both, ordered by
/// block id. Repeated values at one position of a block are averaged.
fn complete_blocks(observations: &[TrialObservation], first: u32, last: u32) -> (Vec<f64>, Vec<f64>) {
    let mut cells: BTreeMap<&str, [Vec<f64>; 2]> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        let slot = if obs.position == first {
            0
        } else if obs.position == last {
            1
        } else {
            continue;
        };
        cells.entry(obs.block_id.as_str()).or_default()[slot].push(obs.value);
    }

    cells
        .values()
        .filter(|cell| cell.iter().all(|values| !values.is_empty()))
        .map(|[a, b]| (mean(a), mean(b)))
        .unzip()
}

/// Trend of `observations` across trial positions.
///
/// Fails only when no finite observation is left.
pub fn trial_trend(observations: &[TrialObservation], config: &TrendConfig) -> Result<TrialTrend> {
    if config.first_position == config.last_position {
        return Err(EntropyError::InvalidParameter(format!(
            "paired positions must differ, got {} twice",
            config.first_position
        )));
    }
    let valid: Vec<&TrialObservation> = observations.iter().filter(|o| o.value.is_finite()).collect();
    if valid.is_empty() {
        return Err(EntropyError::EmptyData);
    }

    let positions = position_summaries(observations);

    let (before, after) = complete_blocks(observations, config.first_position, config.last_position);
    let paired = if before.len() < config.min_blocks {
        debug!(
            blocks = before.len(),
            needed = config.min_blocks,
            "too few complete blocks for the paired comparison"
        );
        None
    } else {
        match paired_t_test(&before, &after) {
            Ok(test) => {
                let diffs: Vec<f64> = before.iter().zip(&after).map(|(b, a)| a - b).collect();
                let mut rng = StdRng::seed_from_u64(config.seed);
                let interval = bootstrap_mean_ci(&diffs, config.n_resamples, config.level, &mut rng)?;
                Some(PairedChange { test, interval })
            }
            Err(err) => {
                warn!(error = %err, "paired comparison unavailable");
                None
            }
        }
    };

    let x: Vec<f64> = valid.iter().map(|o| o.position as f64).collect();
    let y: Vec<f64> = valid.iter().map(|o| o.value).collect();
    let trend = match linear_trend(&x, &y) {
        Ok(fit) => Some(fit),
        Err(err) => {
            debug!(error = %err, "no linear trend");
            None
        }
    };

    Ok(TrialTrend {
        positions,
        paired,
        trend,
    })
}
