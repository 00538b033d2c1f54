//! Dataset-level complexity pipeline.
//!
//! A dataset is processed in three phases:
//!
//! 1. per-file (m, τ) estimation, in parallel
//! 2. aggregation into one global (m, τ)
//! 3. per-file reconstruction, symbolization and entropy, in parallel
//!
//! followed by the group comparison of both entropy measures.

use super::config::PipelineConfig;
use crate::clustering::select_alphabet_size;
use crate::core::{DegenerateInput, Estimate, SubjectSignal};
use crate::embedding::{
    aggregate_parameters, estimate_delay, estimate_dimension, EmbeddingParameters,
    GlobalEmbeddingParameters,
};
use crate::entropy::{permutation_entropy, symbolic_entropy};
use crate::error::{EntropyError, Result};
use crate::stats::{compare_groups, GroupComparison};
use crate::transform::standardize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Shortest signal the parameter estimators accept.
pub const MIN_ESTIMATION_LEN: usize = 8;

/// Per-file embedding estimate with the provenance of each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterEstimate {
    pub params: EmbeddingParameters,
    pub delay: Estimate<usize>,
    pub dimension: Estimate<usize>,
}

/// Complexity measures for one subject.
///
/// An entropy that could not be computed is NaN and `failure` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectResult {
    pub subject_id: String,
    pub group: String,
    pub symbolic_entropy: f64,
    pub permutation_entropy: f64,
    /// Alphabet size used for the symbolic encoding
    pub alphabet_size: Option<Estimate<usize>>,
    /// Seed of the clustering generator
    pub seed: u64,
    pub failure: Option<String>,
}

impl SubjectResult {
    fn unavailable(signal: &SubjectSignal, seed: u64) -> Self {
        Self {
            subject_id: signal.subject_id().to_string(),
            group: signal.group().to_string(),
            symbolic_entropy: f64::NAN,
            permutation_entropy: f64::NAN,
            alphabet_size: None,
            seed,
            failure: None,
        }
    }

    fn record_failure(&mut self, stage: &str, err: &EntropyError) {
        warn!(subject = %self.subject_id, stage, error = %err, "entropy unavailable");
        if self.failure.is_none() {
            self.failure = Some(format!("{stage}: {err}"));
        }
    }

    /// Whether both entropies were computed.
    pub fn is_complete(&self) -> bool {
        self.symbolic_entropy.is_finite() && self.permutation_entropy.is_finite()
    }
}

/// Everything produced for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    /// Base seed of the run
    pub seed: u64,
    pub global: GlobalEmbeddingParameters,
    /// One entry per input, in input order
    pub subjects: Vec<SubjectResult>,
    pub symbolic: GroupComparison,
    pub permutation: GroupComparison,
}

/// Runs the complexity pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ComplexityPipeline {
    config: PipelineConfig,
}

impl ComplexityPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Estimate (m, τ) for one raw signal.
    ///
    /// Signals that cannot be normalized or are too short for either search
    /// are errors, so the caller can leave them out of the aggregation.
    pub fn estimate_parameters(&self, samples: &[f64]) -> Result<ParameterEstimate> {
        let normalized = standardize(samples)?.data;
        if normalized.len() < MIN_ESTIMATION_LEN {
            return Err(EntropyError::InsufficientData {
                needed: MIN_ESTIMATION_LEN,
                got: normalized.len(),
            });
        }

        let delay = estimate_delay(&normalized, self.config.max_delay, self.config.ami_bins);
        let dimension = estimate_dimension(
            &normalized,
            delay.value(),
            self.config.max_dimension,
            self.config.fnn_tolerance,
            self.config.fnn_threshold,
        )?;

        for estimate in [delay, dimension] {
            if let Some(reason @ DegenerateInput::TooShort { .. }) = estimate.reason() {
                return Err(EntropyError::ComputationError(reason.to_string()));
            }
        }

        Ok(ParameterEstimate {
            params: EmbeddingParameters::new(dimension.value(), delay.value()),
            delay,
            dimension,
        })
    }

    /// Estimate every file in parallel and aggregate the global (m, τ).
    ///
    /// Files that are empty, short or hold non-finite samples, and files
    /// whose estimation fails, are skipped; the dataset fails only when
    /// no file yields an estimate.
    pub fn global_parameters(&self, inputs: &[SubjectSignal]) -> Result<GlobalEmbeddingParameters> {
        let estimates: Vec<EmbeddingParameters> = inputs
            .par_iter()
            .filter_map(|signal| match signal
                .validate(MIN_ESTIMATION_LEN)
                .and_then(|()| self.estimate_parameters(signal.samples()))
            {
                Ok(estimate) => {
                    debug!(
                        subject = signal.subject_id(),
                        dimension = estimate.params.dimension,
                        delay = estimate.params.delay,
                        delay_fallback = ?estimate.delay.reason(),
                        dimension_fallback = ?estimate.dimension.reason(),
                        "embedding estimate"
                    );
                    Some(estimate.params)
                }
                Err(err) => {
                    warn!(
                        subject = signal.subject_id(),
                        error = %err,
                        "skipping file for parameter estimation"
                    );
                    None
                }
            })
            .collect();

        let global = aggregate_parameters(&estimates, inputs.len())?;
        info!(
            dimension = global.params.dimension,
            delay = global.params.delay,
            estimates = global.n_estimates,
            files = global.n_files,
            "global embedding parameters"
        );
        Ok(global)
    }

    /// Compute both entropies for one subject under fixed parameters.
    ///
    /// Never fails: problems turn the affected entropy into NaN.
    pub fn analyze_subject(
        &self,
        signal: &SubjectSignal,
        params: EmbeddingParameters,
        seed: u64,
    ) -> SubjectResult {
        let mut result = SubjectResult::unavailable(signal, seed);

        let normalized = match standardize(signal.samples()) {
            Ok(scaled) => scaled.data,
            Err(err) => {
                result.record_failure("normalization", &err);
                return result;
            }
        };

        match permutation_entropy(
            &normalized,
            self.config.permutation_order,
            self.config.permutation_delay,
        ) {
            Ok(pe) => result.permutation_entropy = pe,
            Err(err) => result.record_failure("permutation entropy", &err),
        }

        match self.symbolize(&normalized, params, seed) {
            Ok((alphabet_size, entropy)) => {
                result.alphabet_size = Some(alphabet_size);
                result.symbolic_entropy = entropy;
            }
            Err(err) => result.record_failure("symbolic entropy", &err),
        }

        result
    }

    fn symbolize(
        &self,
        normalized: &[f64],
        params: EmbeddingParameters,
        seed: u64,
    ) -> Result<(Estimate<usize>, f64)> {
        let points = params.embed(normalized);
        let base = self.config.kmeans_config();
        let mut rng = StdRng::seed_from_u64(seed);

        let selection = select_alphabet_size(&points, self.config.max_alphabet, &base, &mut rng);
        if let Some(reason) = selection.alphabet_size.reason() {
            debug!(%reason, alphabet_size = selection.alphabet_size.value(), "alphabet fallback");
        }

        let encoded = symbolic_entropy(
            &points,
            selection.alphabet_size.value(),
            self.config.word_length,
            &base,
            &mut rng,
        )?;
        Ok((selection.alphabet_size, encoded.entropy))
    }

    /// Run the full pipeline on one dataset and compare `group_a` with `group_b`.
    ///
    /// Subject i clusters with `seed + i`. Inputs belonging to neither group
    /// are analyzed and reported but left out of the comparison.
    pub fn run(
        &self,
        inputs: &[SubjectSignal],
        group_a: &str,
        group_b: &str,
    ) -> Result<DatasetReport> {
        self.config.validate()?;
        let global = self.global_parameters(inputs)?;

        let subjects: Vec<SubjectResult> = inputs
            .par_iter()
            .enumerate()
            .map(|(i, signal)| self.analyze_subject(signal, global.params, self.config.subject_seed(i)))
            .collect();

        let symbolic = self.compare(&subjects, group_a, group_b, |r| r.symbolic_entropy)?;
        let permutation = self.compare(&subjects, group_a, group_b, |r| r.permutation_entropy)?;

        info!(
            subjects = subjects.len(),
            complete = subjects.iter().filter(|r| r.is_complete()).count(),
            symbolic_p = symbolic.result().map(|r| r.p_value),
            permutation_p = permutation.result().map(|r| r.p_value),
            "dataset complete"
        );

        Ok(DatasetReport {
            seed: self.config.seed,
            global,
            subjects,
            symbolic,
            permutation,
        })
    }

    fn compare<F>(
        &self,
        subjects: &[SubjectResult],
        group_a: &str,
        group_b: &str,
        measure: F,
    ) -> Result<GroupComparison>
    where
        F: Fn(&SubjectResult) -> f64,
    {
        let values = |label: &str| -> Vec<f64> {
            subjects
                .iter()
                .filter(|r| r.group == label)
                .map(&measure)
                .collect()
        };
        compare_groups(
            group_a,
            &values(group_a),
            group_b,
            &values(group_b),
            self.config.alpha,
            self.config.alternative,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::uniform_noise as noise;

    fn sine(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period).sin())
            .collect()
    }


    #[test]
    fn sine_parameters_are_estimated() {
        let pipeline = ComplexityPipeline::default();
        let estimate = pipeline.estimate_parameters(&sine(400, 40.0)).unwrap();

        assert!((5..=12).contains(&estimate.params.delay));
        assert!(estimate.params.dimension >= 2);
        assert_eq!(estimate.params.delay, estimate.delay.value());
    }

    #[test]
    fn constant_signal_is_not_estimated() {
        let pipeline = ComplexityPipeline::default();
        assert_eq!(
            pipeline.estimate_parameters(&[3.0; 100]).unwrap_err(),
            EntropyError::ZeroVariance
        );
        assert_eq!(
            pipeline.estimate_parameters(&[1.0, 2.0, 3.0]).unwrap_err(),
            EntropyError::InsufficientData { needed: 8, got: 3 }
        );
    }

    #[test]
    fn no_valid_file_fails_the_dataset() {
        let inputs: Vec<SubjectSignal> = (0..3)
            .map(|i| SubjectSignal::new(format!("S{i}"), "old", vec![1.0; 64]))
            .collect();
        let pipeline = ComplexityPipeline::default();

        assert_eq!(
            pipeline.global_parameters(&inputs).unwrap_err(),
            EntropyError::NoValidEstimates { files: 3 }
        );
        assert!(pipeline.run(&inputs, "old", "young").is_err());
    }

    #[test]
    fn degenerate_file_is_skipped_for_estimation() {
        let inputs = vec![
            SubjectSignal::new("S0", "old", sine(300, 31.7)),
            SubjectSignal::new("S1", "old", vec![0.0; 300]),
        ];
        let global = ComplexityPipeline::default().global_parameters(&inputs).unwrap();
        assert_eq!(global.n_estimates, 1);
        assert_eq!(global.n_files, 2);
    }

    #[test]
    fn invalid_signals_are_skipped_for_estimation() {
        let mut gapped = sine(300, 31.7);
        gapped[17] = f64::NAN;
        let inputs = vec![
            SubjectSignal::new("S0", "old", sine(300, 31.7)),
            SubjectSignal::new("S1", "old", gapped),
            SubjectSignal::new("S2", "old", vec![]),
            SubjectSignal::new("S3", "old", vec![0.5, 1.5, 2.5]),
        ];
        let global = ComplexityPipeline::default().global_parameters(&inputs).unwrap();
        assert_eq!(global.n_estimates, 1);
        assert_eq!(global.n_files, 4);
    }

    #[test]
    fn zero_variance_subject_is_nan() {
        let pipeline = ComplexityPipeline::default();
        let signal = SubjectSignal::new("S9", "young", vec![2.0; 200]);
        let result = pipeline.analyze_subject(&signal, EmbeddingParameters::new(3, 2), 7);

        assert!(result.symbolic_entropy.is_nan());
        assert!(result.permutation_entropy.is_nan());
        assert!(result.alphabet_size.is_none());
        assert_eq!(result.seed, 7);
        assert!(result.failure.unwrap().starts_with("normalization"));
    }

    #[test]
    fn subject_analysis_is_reproducible() {
        let pipeline = ComplexityPipeline::default();
        let signal = SubjectSignal::new("S1", "old", noise(300, 5));
        let params = EmbeddingParameters::new(3, 2);

        let first = pipeline.analyze_subject(&signal, params, 11);
        let second = pipeline.analyze_subject(&signal, params, 11);
        assert_eq!(first, second);
        assert!(first.is_complete());
        assert!(first.alphabet_size.is_some());
    }

    #[test]
    fn run_assigns_offset_seeds_in_input_order() {
        let inputs: Vec<SubjectSignal> = (0..4)
            .map(|i| {
                let group = if i % 2 == 0 { "old" } else { "young" };
                SubjectSignal::new(format!("S{i}"), group, noise(256, i as u64 + 1))
            })
            .collect();
        let pipeline = ComplexityPipeline::new(PipelineConfig::default().seed(100));
        let report = pipeline.run(&inputs, "old", "young").unwrap();

        assert_eq!(report.seed, 100);
        let seeds: Vec<u64> = report.subjects.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
        let ids: Vec<&str> = report.subjects.iter().map(|r| r.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["S0", "S1", "S2", "S3"]);
        assert!(!report.symbolic.is_insufficient());
        assert!(!report.permutation.is_insufficient());
    }
}
