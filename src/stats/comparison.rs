//! Two-group comparison of per-subject entropy values.

use super::descriptive::{cohens_d, finite_values, GroupSummary};
use super::rank_sum::{mann_whitney_u, Alternative, RankTestMethod};
use crate::error::{EntropyError, Result};
use serde::Serialize;

/// Minimum number of valid values per group for a rank test.
pub const MIN_GROUP_SIZE: usize = 2;

/// Computed comparison between two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparisonResult {
    pub group_a: GroupSummary,
    pub group_b: GroupSummary,
    /// Mann–Whitney U of group A
    pub u_statistic: f64,
    pub p_value: f64,
    pub method: RankTestMethod,
    pub alternative: Alternative,
    /// Significance level the flag was computed against
    pub alpha: f64,
    pub significant: bool,
    /// Cohen's d of A relative to B
    pub cohens_d: f64,
}

/// Outcome of comparing two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GroupComparison {
    /// Both groups had enough valid values.
    Computed(GroupComparisonResult),
    /// At least one group had fewer than [`MIN_GROUP_SIZE`] valid values.
    InsufficientData {
        group_a: GroupSummary,
        group_b: GroupSummary,
    },
}

impl GroupComparison {
    /// The computed result, if the test could run.
    pub fn result(&self) -> Option<&GroupComparisonResult> {
        match self {
            GroupComparison::Computed(r) => Some(r),
            GroupComparison::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, GroupComparison::InsufficientData { .. })
    }

    /// Summaries of both groups, available in either outcome.
    pub fn summaries(&self) -> (&GroupSummary, &GroupSummary) {
        match self {
            GroupComparison::Computed(r) => (&r.group_a, &r.group_b),
            GroupComparison::InsufficientData { group_a, group_b } => (group_a, group_b),
        }
    }
}

/// Compare the entropy values of two groups.
///
/// NaN values are dropped before counting, so subjects whose entropy could
/// not be computed never enter the denominator.
pub fn compare_groups(
    label_a: &str,
    values_a: &[f64],
    label_b: &str,
    values_b: &[f64],
    alpha: f64,
    alternative: Alternative,
) -> Result<GroupComparison> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(EntropyError::InvalidParameter(format!(
            "alpha must lie in (0, 1), got {alpha}"
        )));
    }

    let a = finite_values(values_a);
    let b = finite_values(values_b);
    let group_a = GroupSummary::from_values(label_a, &a);
    let group_b = GroupSummary::from_values(label_b, &b);

    if a.len() < MIN_GROUP_SIZE || b.len() < MIN_GROUP_SIZE {
        return Ok(GroupComparison::InsufficientData { group_a, group_b });
    }

    let test = mann_whitney_u(&a, &b, alternative)?;

    Ok(GroupComparison::Computed(GroupComparisonResult {
        group_a,
        group_b,
        u_statistic: test.u_statistic,
        p_value: test.p_value,
        method: test.method,
        alternative,
        alpha,
        significant: test.is_significant(alpha),
        cohens_d: cohens_d(&a, &b),
    }))
}
