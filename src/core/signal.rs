//! Per-subject input signals.

use crate::error::{EntropyError, Result};

/// One subject's raw channel together with its identifiers.
///
/// Samples are never mutated after construction; normalization produces a
/// derived copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSignal {
    subject_id: String,
    group: String,
    samples: Vec<f64>,
}

impl SubjectSignal {
    /// Create a signal record for `subject_id` in `group`.
    pub fn new(subject_id: impl Into<String>, group: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            subject_id: subject_id.into(),
            group: group.into(),
            samples,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check that the signal holds at least `min_len` finite samples.
    pub fn validate(&self, min_len: usize) -> Result<()> {
        if self.samples.is_empty() {
            return Err(EntropyError::EmptyData);
        }
        if let Some(index) = self.samples.iter().position(|x| !x.is_finite()) {
            return Err(EntropyError::NonFinite { index });
        }
        if self.samples.len() < min_len {
            return Err(EntropyError::InsufficientData {
                needed: min_len,
                got: self.samples.len(),
            });
        }
        Ok(())
    }
}
