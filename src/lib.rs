//! # gait-entropy
//!
//! Complexity measures for one-dimensional gait-kinematics signals.
//!
//! Each channel is standardized, embedded in a delay-coordinate phase space
//! whose dimension and delay are estimated from the data (false nearest
//! neighbours and average mutual information), symbolized by k-means with an
//! elbow-selected alphabet, and summarized by a symbolic word entropy and a
//! permutation entropy. Per-subject values are compared between two groups
//! with a Mann–Whitney U test.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod clustering;
pub mod core;
pub mod embedding;
pub mod entropy;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod stats;
pub mod transform;

#[cfg(test)]
mod testing;

pub use error::{EntropyError, Result};

pub mod prelude {
    pub use crate::core::{DegenerateInput, Estimate, SubjectSignal};
    pub use crate::embedding::{EmbeddingParameters, GlobalEmbeddingParameters};
    pub use crate::error::{EntropyError, Result};
    pub use crate::io::{write_subject_results, ChannelReader};
    pub use crate::pipeline::{
        run_conditions, trial_observations, ComplexityPipeline, ConditionKey, DatasetReport,
        PipelineConfig, SubjectResult, TrialAxis,
    };
    pub use crate::stats::{trial_trend, Alternative, GroupComparison, TrendConfig, TrialTrend};
}
