//! F-measure with a fixed tolerance window
//!
//! Each annotation opens a window of ±`f_measure_window` seconds around itself
//! and claims every estimate inside that no earlier annotation has claimed.
//! Matching is greedy and annotation-major, not an optimal bipartite
//! assignment: this is the matching used in the published results this
//! metric is compared against.
//!
//! # Reference
//!
//! Dixon, S. (2006). Onset detection revisited.
//! *Proceedings of the 9th International Conference on Digital Audio Effects (DAFx)*.
//!
//! # Example
//!
//! ```
//! use stratum_eval::metrics::f_measure::f_measure;
//! use stratum_eval::EvaluationConfig;
//!
//! let annotations: Vec<f64> = (5..=9).map(|t| t as f64).collect();
//! let estimates: Vec<f64> = annotations.iter().map(|t| t + 0.02).collect();
//!
//! let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());
//! assert_eq!(result.f_measure, 100.0);
//! ```

use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, Rejection};
use serde::{Deserialize, Serialize};

/// F-measure, precision, recall and accuracy (all percentages) with raw counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FMeasureResult {
    /// Harmonic mean of precision and recall
    pub f_measure: f64,
    /// Hits as a share of all estimates
    pub precision: f64,
    /// Hits as a share of all annotations
    pub recall: f64,
    /// Hits as a share of hits, false positives and false negatives
    pub accuracy: f64,
    /// Annotations with at least one estimate in their window
    pub hits: usize,
    /// Surplus estimates inside windows plus unclaimed estimates
    pub false_positives: usize,
    /// Annotations with an empty window
    pub false_negatives: usize,
}

impl FMeasureResult {
    /// Derive the percentages from match counts
    ///
    /// Every ratio with a zero denominator is defined as 0.
    pub fn from_counts(hits: usize, false_positives: usize, false_negatives: usize) -> Self {
        let ratio = |num: usize, den: usize| {
            if den > 0 {
                100.0 * num as f64 / den as f64
            } else {
                0.0
            }
        };

        let precision = ratio(hits, hits + false_positives);
        let recall = ratio(hits, hits + false_negatives);
        let f_measure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let accuracy = ratio(hits, hits + false_positives + false_negatives);

        Self {
            f_measure,
            precision,
            recall,
            accuracy,
            hits,
            false_positives,
            false_negatives,
        }
    }
}

/// Compute the F-measure of `estimates` against `annotations`
///
/// Returns the all-zero result when either sequence is empty after lead-in
/// trimming or holds values that are not plausibly seconds.
pub fn f_measure(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> FMeasureResult {
    f_measure_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("F-measure: {}, assigning zero to all outputs", rejection);
        FMeasureResult::default()
    })
}

/// Like [`f_measure`], but reports why a pair was not scored
pub fn f_measure_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<FMeasureResult, Rejection> {
    let pair = prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 1,
            max_event_time: config.max_event_time,
        },
    )?;

    log::debug!(
        "F-measure: {} annotations, {} estimates, window={:.3}s",
        pair.annotations.len(),
        pair.estimates.len(),
        config.f_measure_window
    );

    let (hits, false_positives, false_negatives) =
        match_windows(&pair.annotations, &pair.estimates, config.f_measure_window);

    Ok(FMeasureResult::from_counts(
        hits,
        false_positives,
        false_negatives,
    ))
}

/// Greedy window matching; returns (hits, false positives, false negatives)
///
/// The estimates are read-only: consumption is tracked in a private bitmap.
fn match_windows(annotations: &[f64], estimates: &[f64], delta: f64) -> (usize, usize, usize) {
    let mut consumed = vec![false; estimates.len()];
    let mut hits = 0;
    let mut false_positives = 0;
    let mut false_negatives = 0;

    for &annotation in annotations {
        let window_min = annotation - delta;
        let window_max = annotation + delta;

        let mut in_window = 0;
        for (claimed, &estimate) in consumed.iter_mut().zip(estimates) {
            if !*claimed && estimate >= window_min && estimate <= window_max {
                *claimed = true;
                in_window += 1;
            }
        }

        match in_window {
            0 => false_negatives += 1,
            n => {
                hits += 1;
                false_positives += n - 1;
            }
        }
    }

    false_positives += consumed.iter().filter(|&&c| !c).count();
    (hits, false_positives, false_negatives)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_second_grid() -> Vec<f64> {
        (1..=360).map(|i| i as f64 / 2.0).collect()
    }

    #[test]
    fn test_identical_sequences() {
        let beats = half_second_grid();
        let result = f_measure(&beats, &beats, &EvaluationConfig::default());
        assert_eq!(result.f_measure, 100.0);
        assert_eq!(result.precision, 100.0);
        assert_eq!(result.recall, 100.0);
        assert_eq!(result.accuracy, 100.0);
    }

    #[test]
    fn test_empty_sequences_score_zero() {
        let config = EvaluationConfig::default();
        let beats = half_second_grid();

        assert_eq!(f_measure(&[], &[], &config), FMeasureResult::default());
        assert_eq!(f_measure(&beats, &[], &config), FMeasureResult::default());
        assert_eq!(f_measure(&[], &beats, &config), FMeasureResult::default());
    }

    #[test]
    fn test_offbeat_estimates_score_zero() {
        let annotations = half_second_grid();
        let estimates: Vec<f64> = annotations.iter().map(|t| t + 0.25).collect();
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());
        assert_eq!(result.f_measure, 0.0);
        assert_eq!(result.hits, 0);
    }

    #[test]
    fn test_double_speed_halves_precision() {
        let annotations = half_second_grid();
        let estimates: Vec<f64> = annotations
            .iter()
            .flat_map(|&t| [t, t + 0.25])
            .collect();
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());

        assert!((result.precision - 50.0).abs() < 1e-9, "precision {}", result.precision);
        assert_eq!(result.recall, 100.0);
        assert!((result.f_measure - 200.0 / 3.0).abs() < 1e-9);
        assert!((result.accuracy - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_speed_halves_recall() {
        let annotations: Vec<f64> = (10..=60).map(|i| i as f64 / 2.0).collect();
        let estimates: Vec<f64> = annotations.iter().step_by(2).copied().collect();
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());

        assert_eq!(result.precision, 100.0);
        assert_eq!(result.hits, 26);
        assert_eq!(result.false_negatives, 25);
    }

    #[test]
    fn test_extra_estimates_in_window_are_each_false_positives() {
        let annotations = [6.0, 7.0, 8.0];
        let estimates = [5.99, 6.0, 6.01, 7.0, 8.0];
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());

        assert_eq!(result.hits, 3);
        assert_eq!(result.false_positives, 2);
        assert_eq!(result.false_negatives, 0);
        assert!((result.precision - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_consumed_estimate_not_reused() {
        // 6.05 falls into both windows but belongs to the first annotation only
        let annotations = [6.0, 6.1];
        let estimates = [6.05];
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());
        assert_eq!(result.hits, 1);
        assert_eq!(result.false_negatives, 1);
        assert_eq!(result.false_positives, 0);
    }

    #[test]
    fn test_unsorted_estimates_are_not_mutated() {
        let annotations = [6.0, 7.0, 8.0];
        let estimates = vec![8.01, 6.02, 7.03];
        let before = estimates.clone();
        let result = f_measure(&annotations, &estimates, &EvaluationConfig::default());
        assert_eq!(result.f_measure, 100.0);
        assert_eq!(estimates, before);
    }

    #[test]
    fn test_implausible_times_score_zero() {
        let annotations = [6.0, 7.0, 8.0];
        let estimates = [6.0, 7.0, 352800.0];
        let checked = f_measure_checked(&annotations, &estimates, &EvaluationConfig::default());
        assert!(matches!(checked, Err(Rejection::ImplausibleTimes { .. })));
    }

    #[test]
    fn test_from_counts_zero_denominators() {
        let result = FMeasureResult::from_counts(0, 0, 0);
        assert_eq!(result, FMeasureResult::default());
    }
}
