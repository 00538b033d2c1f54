//! Mann–Whitney U (Wilcoxon rank-sum) test for two independent samples.

use crate::error::{EntropyError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Samples smaller than this (without ties) use the exact null distribution.
const EXACT_SIZE_LIMIT: usize = 8;

/// Alternative hypothesis for the rank test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alternative {
    /// Distributions differ in either direction.
    #[default]
    TwoSided,
    /// First sample tends to be larger.
    Greater,
    /// First sample tends to be smaller.
    Less,
}

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankTestMethod {
    /// Enumerated null distribution of U.
    Exact,
    /// Normal approximation with tie and continuity corrections.
    Asymptotic,
}

/// Mann–Whitney U test result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample (pairs where it is larger, ties count half)
    pub u_statistic: f64,
    /// P-value under the chosen alternative
    pub p_value: f64,
    pub method: RankTestMethod,
    pub alternative: Alternative,
}

impl MannWhitneyResult {
    /// Check whether the null hypothesis is rejected at `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Perform the Mann–Whitney U test on samples `a` and `b`.
///
/// Uses the exact distribution of U when there are no ties and either sample
/// has fewer than 8 values, otherwise the normal approximation.
pub fn mann_whitney_u(a: &[f64], b: &[f64], alternative: Alternative) -> Result<MannWhitneyResult> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 == 0 || n2 == 0 {
        return Err(EntropyError::EmptyData);
    }
    if let Some(index) = a.iter().chain(b.iter()).position(|x| !x.is_finite()) {
        return Err(EntropyError::NonFinite { index });
    }

    let (ranks, tie_sizes) = average_ranks(a, b);
    let rank_sum_a: f64 = ranks[..n1].iter().sum();
    let u1 = rank_sum_a - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;

    let has_ties = tie_sizes.iter().any(|&t| t > 1);
    let (p_value, method) = if !has_ties && n1.min(n2) < EXACT_SIZE_LIMIT {
        (exact_p_value(n1, n2, u1, u2, alternative), RankTestMethod::Exact)
    } else {
        (
            asymptotic_p_value(n1, n2, u1, u2, &tie_sizes, alternative)?,
            RankTestMethod::Asymptotic,
        )
    };

    Ok(MannWhitneyResult {
        u_statistic: u1,
        p_value: p_value.min(1.0),
        method,
        alternative,
    })
}

/// Ranks of the pooled sample (a first, then b) with ties averaged, plus the
/// size of every tie group.
fn average_ranks(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&i, &j| pooled[i].total_cmp(&pooled[j]));

    let mut ranks = vec![0.0; pooled.len()];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && pooled[order[end]] == pooled[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the group shares the mean of start+1..=end.
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        tie_sizes.push(end - start);
        start = end;
    }

    (ranks, tie_sizes)
}

/// Number of orderings of `n1` + `n2` distinct values giving each U of the
/// first sample, indexed by U.
///
/// These are the coefficients of the Gaussian binomial [n1 + n2 choose k]
/// with k = min(n1, n2), built row by row with the q-Pascal rule, so memory
/// stays at (k + 1) rows of n1 * n2 + 1 counts.
fn exact_u_counts(n1: usize, n2: usize) -> Vec<f64> {
    let k = n1.min(n2);
    let max_u = n1 * n2;
    // rows[j][u]: orderings of j values among i that score U = u.
    let mut rows = vec![vec![0.0; max_u + 1]; k + 1];
    rows[0][0] = 1.0;

    for i in 1..=(n1 + n2) {
        // j descends so rows[j - 1] still holds the previous i.
        for j in (1..=k.min(i)).rev() {
            let (lower, upper) = rows.split_at_mut(j);
            let shorter = &lower[j - 1];
            let row = &mut upper[0];
            // u descends so row[u - j] still holds the previous i.
            for u in (0..=j * (i - j)).rev() {
                let shifted = if u >= j { row[u - j] } else { 0.0 };
                row[u] = shorter[u] + shifted;
            }
        }
    }

    rows.swap_remove(k)
}

fn exact_p_value(n1: usize, n2: usize, u1: f64, u2: f64, alternative: Alternative) -> f64 {
    let counts = exact_u_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    let upper_tail = |u: f64| -> f64 {
        let from = u.round() as usize;
        counts.iter().skip(from).sum::<f64>() / total
    };

    match alternative {
        Alternative::TwoSided => 2.0 * upper_tail(u1.max(u2)),
        Alternative::Greater => upper_tail(u1),
        Alternative::Less => upper_tail(u2),
    }
}

fn asymptotic_p_value(
    n1: usize,
    n2: usize,
    u1: f64,
    u2: f64,
    tie_sizes: &[usize],
    alternative: Alternative,
) -> Result<f64> {
    let n = (n1 + n2) as f64;
    let mu = (n1 * n2) as f64 / 2.0;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = (n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        // Every value tied.
        return Ok(1.0);
    }
    let sigma = variance.sqrt();

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| EntropyError::ComputationError(format!("normal distribution: {e}")))?;
    let sf = |u: f64| normal.sf((u - mu - 0.5) / sigma);

    Ok(match alternative {
        Alternative::TwoSided => 2.0 * sf(u1.max(u2)),
        Alternative::Greater => sf(u1),
        Alternative::Less => sf(u2),
    })
}
