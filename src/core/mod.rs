//! Core data structures shared by the pipeline stages.

mod estimate;
mod signal;

pub use estimate::{DegenerateInput, Estimate};
pub use signal::SubjectSignal;
