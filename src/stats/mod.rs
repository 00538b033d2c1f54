//! Group statistics for per-subject entropy values and their change across
//! trials.
//!
//! # Example
//!
//! ```
//! use gait_entropy::stats::{compare_groups, Alternative};
//!
//! let old = [0.30, 0.32, 0.31, 0.33];
//! let young = [0.20, 0.21, 0.19, 0.22];
//! let cmp = compare_groups("old", &old, "young", &young, 0.05, Alternative::TwoSided).unwrap();
//! assert!(cmp.result().unwrap().significant);
//! ```

pub mod comparison;
pub mod descriptive;
pub mod rank_sum;
pub mod trend;

pub use comparison::{compare_groups, GroupComparison, GroupComparisonResult, MIN_GROUP_SIZE};
pub use descriptive::{
    cohens_d, finite_values, mean, median, quantile, rounded_median, sem, std_dev, variance,
    GroupSummary,
};
pub use rank_sum::{mann_whitney_u, Alternative, MannWhitneyResult, RankTestMethod};
pub use trend::{
    bootstrap_mean_ci, linear_trend, paired_t_test, position_summaries, trial_trend,
    BootstrapInterval, LinearTrend, PairedChange, PairedTTest, PositionSummary, TrendConfig,
    TrialObservation, TrialTrend,
};
