//! Experimental conditions and batch runs over them.
//!
//! Recordings are tagged `Dxx_Bxx_Txx` (day, block, trial); file stems carry
//! the subject and group code in front, as in `S001_G03_D01_B02_T05`.

use super::runner::{ComplexityPipeline, DatasetReport, SubjectResult};
use crate::core::SubjectSignal;
use crate::error::{EntropyError, Result};
use crate::stats::TrialObservation;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Composite key identifying one experimental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConditionKey {
    pub day: u32,
    pub block: u32,
    pub trial: u32,
}

impl ConditionKey {
    pub fn new(day: u32, block: u32, trial: u32) -> Self {
        Self { day, block, trial }
    }

    /// 1-based position of the trial within its day.
    pub fn trial_number(&self, trials_per_block: u32) -> u32 {
        self.block.saturating_sub(1) * trials_per_block + self.trial
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{:02}_B{:02}_T{:02}", self.day, self.block, self.trial)
    }
}

/// Parse one `<prefix><digits>` component.
fn tagged_number(part: &str, prefix: char, tag: &str) -> Result<u32> {
    part.strip_prefix(prefix)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| EntropyError::InvalidParameter(format!("malformed tag '{tag}'")))
}

impl FromStr for ConditionKey {
    type Err = EntropyError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('_').collect();
        let [day, block, trial] = parts.as_slice() else {
            return Err(EntropyError::InvalidParameter(format!(
                "malformed condition '{s}'"
            )));
        };
        Ok(Self {
            day: tagged_number(day, 'D', s)?,
            block: tagged_number(block, 'B', s)?,
            trial: tagged_number(trial, 'T', s)?,
        })
    }
}

/// Identifiers encoded in a recording's file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileTag {
    /// Subject identifier, e.g. `S001`
    pub subject: String,
    pub group_code: u32,
    pub condition: ConditionKey,
}

impl FromStr for FileTag {
    type Err = EntropyError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || EntropyError::InvalidParameter(format!("malformed file tag '{s}'"));
        let (subject, rest) = s.split_once('_').ok_or_else(malformed)?;
        let (group, condition) = rest.split_once('_').ok_or_else(malformed)?;

        tagged_number(subject, 'S', s)?;
        Ok(Self {
            subject: subject.to_string(),
            group_code: tagged_number(group, 'G', s)?,
            condition: condition.parse()?,
        })
    }
}

/// Run every condition as an independent dataset.
///
/// A failed condition is reported in its slot and never stops the batch.
pub fn run_conditions(
    pipeline: &ComplexityPipeline,
    datasets: &BTreeMap<ConditionKey, Vec<SubjectSignal>>,
    group_a: &str,
    group_b: &str,
) -> BTreeMap<ConditionKey, Result<DatasetReport>> {
    datasets
        .iter()
        .map(|(&key, inputs)| {
            let report = pipeline.run(inputs, group_a, group_b);
            match &report {
                Ok(r) => info!(condition = %key, subjects = r.subjects.len(), "condition done"),
                Err(err) => warn!(condition = %key, error = %err, "condition failed"),
            }
            (key, report)
        })
        .collect()
}

/// How conditions map onto trial positions for a trend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialAxis {
    /// Trial number within its block; every block is its own series.
    #[default]
    WithinBlock,
    /// Trial counted through the day's blocks; every day is one series.
    AcrossBlocks { trials_per_block: u32 },
}

impl TrialAxis {
    /// Series id and position of `subject`'s recording under `key`.
    fn place(&self, subject: &str, key: &ConditionKey) -> (String, u32) {
        match *self {
            TrialAxis::WithinBlock => (
                format!("{subject}_D{:02}_B{:02}", key.day, key.block),
                key.trial,
            ),
            TrialAxis::AcrossBlocks { trials_per_block } => (
                format!("{subject}_D{:02}", key.day),
                key.trial_number(trials_per_block),
            ),
        }
    }
}

fn subject_observations<F>(
    key: &ConditionKey,
    subjects: &[SubjectResult],
    group: &str,
    axis: TrialAxis,
    measure: &F,
) -> Vec<TrialObservation>
where
    F: Fn(&SubjectResult) -> f64,
{
    subjects
        .iter()
        .filter(|r| r.group == group)
        .map(|r| {
            let (block_id, position) = axis.place(&r.subject_id, key);
            TrialObservation {
                block_id,
                position,
                value: measure(r),
            }
        })
        .collect()
}

/// Collect one group's entropy values from a batch as trial observations.
///
/// Failed conditions contribute nothing; NaN entropies are kept and left to
/// the trend analysis to skip.
pub fn trial_observations<F>(
    reports: &BTreeMap<ConditionKey, Result<DatasetReport>>,
    group: &str,
    axis: TrialAxis,
    measure: F,
) -> Vec<TrialObservation>
where
    F: Fn(&SubjectResult) -> f64,
{
    reports
        .iter()
        .filter_map(|(key, report)| report.as_ref().ok().map(|r| (key, r)))
        .flat_map(|(key, report)| subject_observations(key, &report.subjects, group, axis, &measure))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_condition_tags() {
        let key: ConditionKey = "D01_B02_T03".parse().unwrap();
        assert_eq!(key, ConditionKey::new(1, 2, 3));
        assert_eq!(key.to_string(), "D01_B02_T03");
    }

    #[test]
    fn rejects_malformed_conditions() {
        for bad in ["D01_B02", "D01_B02_T", "X01_B02_T03", "D01_B02_T03_X", "D1a_B02_T03"] {
            assert!(bad.parse::<ConditionKey>().is_err(), "{bad}");
        }
    }

    #[test]
    fn parses_file_stems() {
        let tag: FileTag = "S001_G03_D01_B02_T05".parse().unwrap();
        assert_eq!(tag.subject, "S001");
        assert_eq!(tag.group_code, 3);
        assert_eq!(tag.condition, ConditionKey::new(1, 2, 5));

        assert!("S001_G03".parse::<FileTag>().is_err());
        assert!("P001_G03_D01_B02_T05".parse::<FileTag>().is_err());
    }

    #[test]
    fn trial_number_counts_across_blocks() {
        assert_eq!(ConditionKey::new(1, 1, 1).trial_number(6), 1);
        assert_eq!(ConditionKey::new(1, 2, 3).trial_number(6), 9);
        assert_eq!(ConditionKey::new(2, 3, 6).trial_number(6), 18);
    }

    fn subject(id: &str, group: &str, entropy: f64) -> SubjectResult {
        SubjectResult {
            subject_id: id.to_string(),
            group: group.to_string(),
            symbolic_entropy: entropy,
            permutation_entropy: f64::NAN,
            alphabet_size: None,
            seed: 0,
            failure: None,
        }
    }

    #[test]
    fn observations_follow_the_trial_axis() {
        let key = ConditionKey::new(2, 3, 2);
        let subjects = vec![
            subject("S001", "old", 0.4),
            subject("S002", "young", 0.3),
            subject("S003", "old", f64::NAN),
        ];

        let entropy = |r: &SubjectResult| r.symbolic_entropy;
        let within = subject_observations(&key, &subjects, "old", TrialAxis::WithinBlock, &entropy);
        assert_eq!(within.len(), 2);
        assert_eq!(within[0].block_id, "S001_D02_B03");
        assert_eq!(within[0].position, 2);
        assert_eq!(within[0].value, 0.4);
        assert!(within[1].value.is_nan());

        let across = subject_observations(
            &key,
            &subjects,
            "young",
            TrialAxis::AcrossBlocks { trials_per_block: 3 },
            &entropy,
        );
        assert_eq!(across.len(), 1);
        assert_eq!(across[0].block_id, "S002_D02");
        assert_eq!(across[0].position, 8);
    }

    #[test]
    fn failed_conditions_contribute_no_observations() {
        let mut reports = BTreeMap::new();
        reports.insert(
            ConditionKey::new(1, 1, 1),
            Err(EntropyError::NoValidEstimates { files: 2 }),
        );
        let obs = trial_observations(&reports, "old", TrialAxis::WithinBlock, |r| r.symbolic_entropy);
        assert!(obs.is_empty());
    }

    #[test]
    fn keys_order_by_day_block_trial() {
        let mut keys = vec![
            ConditionKey::new(2, 1, 1),
            ConditionKey::new(1, 2, 1),
            ConditionKey::new(1, 1, 2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ConditionKey::new(1, 1, 2),
                ConditionKey::new(1, 2, 1),
                ConditionKey::new(2, 1, 1),
            ]
        );
    }

    #[test]
    fn failed_condition_does_not_stop_batch() {
        let constant: Vec<SubjectSignal> = (0..2)
            .map(|i| SubjectSignal::new(format!("S{i}"), "old", vec![1.0; 50]))
            .collect();
        let mut datasets = BTreeMap::new();
        datasets.insert(ConditionKey::new(1, 1, 1), constant.clone());
        datasets.insert(ConditionKey::new(1, 1, 2), constant);

        let results = run_conditions(&ComplexityPipeline::default(), &datasets, "old", "young");
        assert_eq!(results.len(), 2);
        assert!(results.values().all(|r| matches!(
            r,
            Err(EntropyError::NoValidEstimates { files: 2 })
        )));
    }
}
