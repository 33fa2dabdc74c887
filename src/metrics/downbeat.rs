//! Downbeat evaluation
//!
//! Reuses the continuity state walk with tolerances of one sixteenth of a bar
//! (for 4/4). The annotated downbeats are reinterpreted at every beat position
//! within the bar, at double time and at half time, and the estimates are
//! scored against each interpretation. Only total accuracy is used.
//!
//! # References
//!
//! Hainsworth, S. (2004). *Techniques for the automated analysis of musical
//! audio*. PhD thesis, University of Cambridge.
//!
//! Klapuri, A. P., Eronen, A., & Astola, J. (2006). Analysis of the meter of
//! acoustic musical signals. *IEEE Transactions on Audio, Speech and Language
//! Processing*, 14(1), 342-355.

use super::continuity::{sequence_accuracy, ContinuityThresholds};
use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, Rejection};
use crate::preprocessing::metrical_variants::{
    bar_position_variants, half_tempo, subdivide, HalfTempo,
};
use serde::{Deserialize, Serialize};

/// Downbeat scores (all percentages)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownbeatResult {
    /// Total accuracy with the downbeat placed on each beat of the bar;
    /// index 0 is the annotated downbeat
    pub bar_position_scores: Vec<f64>,
    /// Total accuracy against the double-time interpretation
    pub double_time: f64,
    /// Best total accuracy of the two half-time interpretations
    pub half_time: f64,
    /// Best total accuracy over every interpretation
    pub best_overall: f64,
    /// Final downbeat score: the best of the annotated downbeat, double time
    /// and half time
    pub score: f64,
}

impl DownbeatResult {
    /// All-zero result for a sequence pair that could not be scored
    pub fn floor(beats_per_bar: usize) -> Self {
        Self {
            bar_position_scores: vec![0.0; beats_per_bar],
            double_time: 0.0,
            half_time: 0.0,
            best_overall: 0.0,
            score: 0.0,
        }
    }
}

/// Evaluate estimated downbeats against annotated downbeats
///
/// Returns [`DownbeatResult::floor`] when either sequence has fewer than three
/// events after lead-in trimming or a value above the downbeat plausibility
/// bound.
///
/// # Example
///
/// ```
/// use stratum_eval::metrics::downbeat::downbeat_accuracy;
/// use stratum_eval::EvaluationConfig;
///
/// let downbeats: Vec<f64> = (3..=30).map(|bar| bar as f64 * 2.0).collect();
/// let result = downbeat_accuracy(&downbeats, &downbeats, &EvaluationConfig::default());
/// assert_eq!(result.score, 100.0);
/// ```
pub fn downbeat_accuracy(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> DownbeatResult {
    downbeat_accuracy_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("Downbeats: {}, assigning zero to all outputs", rejection);
        DownbeatResult::floor(config.beats_per_bar)
    })
}

/// Like [`downbeat_accuracy`], but reports why a pair was not scored
pub fn downbeat_accuracy_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<DownbeatResult, Rejection> {
    let pair = prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 3,
            max_event_time: config.downbeat_max_event_time,
        },
    )?;

    let beats_per_bar = config.beats_per_bar.max(1);
    let tolerance = config.downbeat_threshold();
    let thresholds = ContinuityThresholds {
        phase: tolerance,
        period: tolerance,
    };

    log::debug!(
        "Downbeats: {} annotations, {} estimates, {} beats per bar, tolerance={:.4}",
        pair.annotations.len(),
        pair.estimates.len(),
        beats_per_bar,
        tolerance
    );

    let score_against = |variant: &[f64]| sequence_accuracy(variant, &pair.estimates, thresholds).total;

    let bar_position_scores: Vec<f64> = bar_position_variants(&pair.annotations, beats_per_bar)
        .iter()
        .map(|variant| score_against(variant))
        .collect();

    let double_time = score_against(&subdivide(&pair.annotations, beats_per_bar as f64 / 2.0));
    let half_time = score_against(&half_tempo(&pair.annotations, HalfTempo::Odd))
        .max(score_against(&half_tempo(&pair.annotations, HalfTempo::Even)));

    let best_overall = bar_position_scores
        .iter()
        .copied()
        .fold(double_time.max(half_time), f64::max);
    let score = bar_position_scores[0].max(double_time).max(half_time);

    log::debug!(
        "Downbeats: score={:.2} (bar position 0={:.2}, double={:.2}, half={:.2})",
        score,
        bar_position_scores[0],
        double_time,
        half_time
    );

    Ok(DownbeatResult {
        bar_position_scores,
        double_time,
        half_time,
        best_overall,
        score,
    })
}
