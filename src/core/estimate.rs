//! Estimator outcomes that keep heuristic fallbacks visible to callers.

use serde::Serialize;
use std::fmt;

/// Why an estimator fell back to a default instead of its primary rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegenerateInput {
    /// Too few samples for the search range.
    TooShort { len: usize },
    /// AMI curve has no interior local minimum; the global minimum was used.
    NoLocalMinimum,
    /// False-neighbour fraction never dropped below the threshold.
    ThresholdNeverCrossed,
    /// Fewer than two cluster counts produced a valid WCSS.
    TooFewCandidates { valid: usize },
    /// WCSS curve is flat or perfectly linear, so it has no elbow.
    NoElbow,
}

impl fmt::Display for DegenerateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateInput::TooShort { len } => write!(f, "signal too short ({len} samples)"),
            DegenerateInput::NoLocalMinimum => write!(f, "no local AMI minimum"),
            DegenerateInput::ThresholdNeverCrossed => write!(f, "FNN threshold never crossed"),
            DegenerateInput::TooFewCandidates { valid } => {
                write!(f, "only {valid} valid cluster counts")
            }
            DegenerateInput::NoElbow => write!(f, "WCSS curve has no elbow"),
        }
    }
}

/// Value produced by an estimator, tagged with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Estimate<T> {
    /// The primary selection rule fired.
    Computed(T),
    /// A fallback default was used.
    Fallback { value: T, reason: DegenerateInput },
}

impl<T: Copy> Estimate<T> {
    /// The estimated value regardless of provenance.
    pub fn value(&self) -> T {
        match *self {
            Estimate::Computed(v) => v,
            Estimate::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Estimate::Fallback { .. })
    }

    /// Fallback reason, if any.
    pub fn reason(&self) -> Option<DegenerateInput> {
        match *self {
            Estimate::Computed(_) => None,
            Estimate::Fallback { reason, .. } => Some(reason),
        }
    }

}
