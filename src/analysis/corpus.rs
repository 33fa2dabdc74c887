//! Corpus-level evaluation
//!
//! Scores every estimate sequence against the annotation sequence at the same
//! position, collects per-file score tables keyed by metric name and reduces
//! them to corpus means with optional bootstrap confidence intervals.
//!
//! Files are evaluated in parallel; the metric selection is resolved to
//! scorer functions once, before the per-file loop.
//!
//! # Example
//!
//! ```
//! use stratum_eval::analysis::corpus::evaluate_corpus;
//! use stratum_eval::{EvaluationConfig, MetricKind};
//!
//! let track: Vec<f64> = (10..=60).map(|i| i as f64 / 2.0).collect();
//! let annotations = vec![track.clone(), track.clone()];
//! let estimates = vec![track.clone(), track.iter().map(|t| t + 0.02).collect()];
//!
//! let corpus = evaluate_corpus(
//!     &annotations,
//!     &estimates,
//!     &[MetricKind::FMeasure],
//!     false,
//!     &EvaluationConfig::default(),
//! )?;
//! assert_eq!(corpus.mean("fMeasure"), Some(100.0));
//! # Ok::<(), stratum_eval::EvaluationError>(())
//! ```

use super::bootstrap::{bootstrap_confidence_interval, mean, ConfidenceInterval};
use super::metadata::EvaluationMetadata;
use super::result::BeatEvaluation;
use crate::config::EvaluationConfig;
use crate::error::EvaluationError;
use crate::metrics::downbeat::{downbeat_accuracy_checked, DownbeatResult};
use crate::metrics::{MetricKind, Scorer};
use crate::preprocessing::gate::Rejection;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Per-file scores of one metric key with their corpus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// One score per file, in input order
    pub scores: Vec<f64>,
    /// Mean over all files
    pub mean: f64,
    /// Bootstrap bounds, when requested
    pub confidence_interval: Option<ConfidenceInterval>,
}

/// Scores of a whole corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEvaluation {
    /// Full per-file results, in input order
    pub files: Vec<BeatEvaluation>,
    /// Summaries keyed by score name (`fMeasure`, `cmlC`, ...)
    pub metrics: BTreeMap<String, MetricSummary>,
    /// Run bookkeeping
    pub metadata: EvaluationMetadata,
}

impl CorpusEvaluation {
    /// Summary for one score key
    pub fn summary(&self, key: &str) -> Option<&MetricSummary> {
        self.metrics.get(key)
    }

    /// Corpus mean for one score key
    pub fn mean(&self, key: &str) -> Option<f64> {
        self.summary(key).map(|summary| summary.mean)
    }

    /// Score keys in reporting order
    pub fn keys(&self) -> Vec<&'static str> {
        MetricKind::ALL
            .iter()
            .flat_map(|kind| kind.score_keys().iter().copied())
            .filter(|key| self.metrics.contains_key(*key))
            .collect()
    }
}

/// Downbeat scores of a whole corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownbeatCorpusEvaluation {
    /// Per-file downbeat results, in input order
    pub files: Vec<DownbeatResult>,
    /// Files that fell back to the floor result, by index
    pub flags: Vec<(usize, Rejection)>,
    /// Summary of the final downbeat scores
    pub downbeats: MetricSummary,
    /// Run bookkeeping
    pub metadata: EvaluationMetadata,
}

/// Evaluate a corpus of beat sequences
///
/// # Arguments
///
/// * `annotations` - Ground-truth sequences; at least one per estimate sequence
/// * `estimates` - Estimated sequences; file `i` is scored against `annotations[i]`
/// * `metrics` - Metrics to run (see [`MetricKind::parse_selection`])
/// * `with_confidence` - Whether to bootstrap confidence intervals
/// * `config` - Evaluation parameters
///
/// # Errors
///
/// Returns `EvaluationError::InvalidInput` if there are fewer annotation
/// sequences than estimate sequences, no estimate sequences, no metrics or an
/// invalid configuration.
pub fn evaluate_corpus(
    annotations: &[Vec<f64>],
    estimates: &[Vec<f64>],
    metrics: &[MetricKind],
    with_confidence: bool,
    config: &EvaluationConfig,
) -> Result<CorpusEvaluation, EvaluationError> {
    let start_time = Instant::now();
    check_corpus(annotations, estimates, config)?;
    if metrics.is_empty() {
        return Err(EvaluationError::InvalidInput("no metrics selected".to_string()));
    }

    log::debug!(
        "Evaluating corpus: {} files, metrics [{}]",
        estimates.len(),
        metrics.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    );

    let scorers: Vec<(MetricKind, Scorer)> = metrics.iter().map(|&m| (m, m.scorer())).collect();
    let files: Vec<BeatEvaluation> = estimates
        .par_iter()
        .zip(annotations.par_iter())
        .enumerate()
        .map(|(i, (est, ann))| {
            log::debug!("Evaluating file {}", i + 1);
            crate::evaluate_resolved(ann, est, &scorers, config)
        })
        .collect();

    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for file in &files {
        for (key, value) in file.scores() {
            columns.entry(key.to_string()).or_default().push(value);
        }
    }

    let mut summaries = BTreeMap::new();
    for (key, scores) in columns {
        let summary = summarise(scores, with_confidence, config)?;
        summaries.insert(key, summary);
    }

    let metadata = EvaluationMetadata {
        file_count: files.len(),
        metrics_used: metrics.iter().map(|m| m.name().to_string()).collect(),
        flagged_files: files.iter().filter(|f| f.has_flags()).count(),
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        ..EvaluationMetadata::default()
    };

    log::debug!(
        "Corpus evaluation finished: {} files ({} flagged) in {:.1} ms",
        metadata.file_count,
        metadata.flagged_files,
        metadata.processing_time_ms
    );

    Ok(CorpusEvaluation {
        files,
        metrics: summaries,
        metadata,
    })
}

/// Evaluate a corpus of downbeat sequences
///
/// # Errors
///
/// Same preconditions as [`evaluate_corpus`].
pub fn evaluate_downbeat_corpus(
    annotations: &[Vec<f64>],
    estimates: &[Vec<f64>],
    with_confidence: bool,
    config: &EvaluationConfig,
) -> Result<DownbeatCorpusEvaluation, EvaluationError> {
    let start_time = Instant::now();
    check_corpus(annotations, estimates, config)?;

    log::debug!("Evaluating downbeat corpus: {} files", estimates.len());

    let outcomes: Vec<Result<DownbeatResult, Rejection>> = estimates
        .par_iter()
        .zip(annotations.par_iter())
        .map(|(est, ann)| downbeat_accuracy_checked(ann, est, config))
        .collect();

    let mut files = Vec::with_capacity(outcomes.len());
    let mut flags = Vec::new();
    for (i, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(result) => files.push(result),
            Err(rejection) => {
                log::warn!("Downbeats, file {}: {}, assigning zero", i + 1, rejection);
                files.push(DownbeatResult::floor(config.beats_per_bar));
                flags.push((i, rejection));
            }
        }
    }

    let scores: Vec<f64> = files.iter().map(|f| f.score).collect();
    let downbeats = summarise(scores, with_confidence, config)?;

    let metadata = EvaluationMetadata {
        file_count: files.len(),
        metrics_used: vec!["downbeats".to_string()],
        flagged_files: flags.len(),
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        ..EvaluationMetadata::default()
    };

    Ok(DownbeatCorpusEvaluation {
        files,
        flags,
        downbeats,
        metadata,
    })
}

fn check_corpus(
    annotations: &[Vec<f64>],
    estimates: &[Vec<f64>],
    config: &EvaluationConfig,
) -> Result<(), EvaluationError> {
    config.validate()?;
    if annotations.len() < estimates.len() {
        return Err(EvaluationError::InvalidInput(format!(
            "not enough annotations for beat sequences ({} annotation sequences, {} estimate sequences)",
            annotations.len(),
            estimates.len()
        )));
    }
    if estimates.is_empty() {
        return Err(EvaluationError::InvalidInput(
            "no estimate sequences to evaluate".to_string(),
        ));
    }
    Ok(())
}

fn summarise(
    scores: Vec<f64>,
    with_confidence: bool,
    config: &EvaluationConfig,
) -> Result<MetricSummary, EvaluationError> {
    let confidence_interval = if with_confidence {
        Some(bootstrap_confidence_interval(
            &scores,
            config.bootstrap_samples,
            config.confidence_interval,
            config.bootstrap_seed,
        )?)
    } else {
        None
    };

    Ok(MetricSummary {
        mean: mean(&scores),
        scores,
        confidence_interval,
    })
}
