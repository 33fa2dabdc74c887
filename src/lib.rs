//! # Stratum Eval
//!
//! Beat and downbeat tracking evaluation: scores an estimated sequence of beat
//! times against a ground-truth annotation sequence with the standard metrics
//! of the beat tracking literature.
//!
//! ## Features
//!
//! - **F-measure**: hit counting within a ±70 ms window
//! - **Cemgil accuracy**: Gaussian-weighted timing error, plus its
//!   allowed-metrical-level variant
//! - **Goto accuracy**: binary test for a stretch of stable tracking
//! - **P-score**: impulse train cross-correlation
//! - **Continuity**: CMLc, CMLt, AMLc and AMLt
//! - **Information gain**: entropy of the beat error histogram
//! - **Downbeats**: continuity-based downbeat accuracy
//! - **Bootstrap confidence intervals** over per-file scores
//!
//! ## Quick Start
//!
//! ```
//! use stratum_eval::{evaluate_beats, EvaluationConfig};
//!
//! let annotations: Vec<f64> = (1..=9).map(|t| t as f64).collect();
//! let estimates: Vec<f64> = annotations.iter().map(|t| t + 0.02).collect();
//!
//! let result = evaluate_beats(&annotations, &estimates, &EvaluationConfig::default());
//!
//! for (name, score) in result.scores() {
//!     println!("{}: {:.2}", name, score);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Sequences → Validity gate → Metrical variants → Metrics → Per-file result → Corpus summary
//! ```
//!
//! Every scorer is total: input that cannot be scored (too few events, values
//! that are not seconds) yields the metric's floor value and a logged
//! diagnostic, never an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod metrics;
pub mod preprocessing;

// Re-export main types
pub use analysis::bootstrap::{bootstrap_confidence_interval, ConfidenceInterval};
pub use analysis::corpus::{evaluate_corpus, evaluate_downbeat_corpus, CorpusEvaluation};
pub use analysis::result::{BeatEvaluation, EvaluationFlag};
pub use config::EvaluationConfig;
pub use error::EvaluationError;
pub use metrics::downbeat::DownbeatResult;
pub use metrics::{MetricKind, MetricScore, Scorer};

/// Evaluate one estimate sequence with every beat metric
///
/// # Arguments
///
/// * `annotations` - Ground-truth beat times in seconds
/// * `estimates` - Estimated beat times in seconds
/// * `config` - Evaluation parameters
///
/// # Returns
///
/// `BeatEvaluation` with every metric filled in. Metrics that could not score
/// the pair hold their floor value and are listed in `flags`.
///
/// # Example
///
/// ```
/// use stratum_eval::{evaluate_beats, EvaluationConfig};
///
/// let beats: Vec<f64> = (10..=40).map(|i| i as f64 / 2.0).collect();
/// let result = evaluate_beats(&beats, &beats, &EvaluationConfig::default());
/// assert_eq!(result.goto, Some(100.0));
/// assert!(result.flags.is_empty());
/// ```
pub fn evaluate_beats(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> BeatEvaluation {
    evaluate_selected(annotations, estimates, &MetricKind::ALL, config)
}

/// Evaluate one estimate sequence with the given metrics
///
/// Metrics not in `metrics` are left as `None`.
pub fn evaluate_selected(
    annotations: &[f64],
    estimates: &[f64],
    metrics: &[MetricKind],
    config: &EvaluationConfig,
) -> BeatEvaluation {
    let scorers: Vec<(MetricKind, Scorer)> = metrics.iter().map(|&m| (m, m.scorer())).collect();
    evaluate_resolved(annotations, estimates, &scorers, config)
}

/// Evaluate one pair with scorers resolved ahead of time
pub(crate) fn evaluate_resolved(
    annotations: &[f64],
    estimates: &[f64],
    scorers: &[(MetricKind, Scorer)],
    config: &EvaluationConfig,
) -> BeatEvaluation {
    log::debug!(
        "Evaluating {} estimates against {} annotations ({} metrics)",
        estimates.len(),
        annotations.len(),
        scorers.len()
    );

    let mut evaluation = BeatEvaluation::default();
    for &(kind, scorer) in scorers {
        let (score, rejection) =
            metrics::run_scorer(kind, scorer, annotations, estimates, config);
        evaluation.record(kind, score);
        if let Some(rejection) = rejection {
            evaluation.flags.push(EvaluationFlag {
                metric: kind,
                rejection,
            });
        }
    }
    evaluation
}

/// Evaluate estimated downbeats against annotated downbeats
///
/// Shorthand for [`metrics::downbeat::downbeat_accuracy`].
pub fn evaluate_downbeats(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> DownbeatResult {
    metrics::downbeat::downbeat_accuracy(annotations, estimates, config)
}
