//! End-to-end complexity analysis of gait datasets.
//!
//! # Example
//!
//! ```
//! use gait_entropy::core::SubjectSignal;
//! use gait_entropy::pipeline::{ComplexityPipeline, PipelineConfig};
//!
//! let signal: Vec<f64> = (0..300).map(|i| (i as f64 * 0.2).sin()).collect();
//! let pipeline = ComplexityPipeline::new(PipelineConfig::default().seed(7));
//! let estimate = pipeline.estimate_parameters(&signal).unwrap();
//! assert!(estimate.params.dimension >= 2);
//!
//! let subject = SubjectSignal::new("S001", "old", signal);
//! let result = pipeline.analyze_subject(&subject, estimate.params, 7);
//! assert!(result.permutation_entropy < 0.5);
//! ```

mod condition;
mod config;
mod runner;

pub use condition::{run_conditions, trial_observations, ConditionKey, FileTag, TrialAxis};
pub use config::PipelineConfig;
pub use runner::{
    ComplexityPipeline, DatasetReport, ParameterEstimate, SubjectResult, MIN_ESTIMATION_LEN,
};
