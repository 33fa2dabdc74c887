//! Continuity-based accuracy (CMLc, CMLt, AMLc, AMLt)
//!
//! An estimate is correct when it sits close enough to its nearest annotation
//! (phase condition) and the gap to its neighbouring estimate agrees with the
//! local inter-annotation interval (period condition). Both tolerances are
//! fractions of that local interval, so they scale with tempo.
//!
//! From the per-estimate flags two scores are derived:
//! - total accuracy: share of correct estimates
//! - continuity accuracy: longest unbroken run of correct estimates
//!
//! Correct metrical level (CML) compares against the annotations as given.
//! Allowed metrical levels (AML) also accept off-beat, double and half tempo
//! interpretations and keep the best.
//!
//! # References
//!
//! Hainsworth, S. (2004). *Techniques for the automated analysis of musical
//! audio*. PhD thesis, University of Cambridge.
//!
//! Klapuri, A. P., Eronen, A., & Astola, J. (2006). Analysis of the meter of
//! acoustic musical signals. *IEEE Transactions on Audio, Speech and Language
//! Processing*, 14(1), 342-355.

use super::nearest_index;
use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, Rejection};
use crate::preprocessing::metrical_variants::MetricalVariants;
use serde::{Deserialize, Serialize};

/// Continuity-based scores (all percentages)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContinuityResult {
    /// Longest continuous correct run, correct metrical level
    pub cml_c: f64,
    /// Total correct, correct metrical level
    pub cml_t: f64,
    /// Longest continuous correct run, best allowed metrical level
    pub aml_c: f64,
    /// Total correct, best allowed metrical level
    pub aml_t: f64,
}

/// Accuracy of one estimate sequence against one annotation variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceAccuracy {
    /// Percentage of estimates judged correct
    pub total: f64,
    /// Longest run of consecutive correct estimates, as a percentage
    pub continuous: f64,
}

/// Tolerances for the continuity state walk, as fractions of the local interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuityThresholds {
    /// Maximum |distance / interval| to the nearest annotation
    pub phase: f64,
    /// Maximum |1 - estimate gap / interval|
    pub period: f64,
}

/// Compute CMLc, CMLt, AMLc and AMLt
///
/// Returns all zeros when either sequence has fewer than two events after
/// lead-in trimming or holds values that are not plausibly seconds.
///
/// # Example
///
/// ```
/// use stratum_eval::metrics::continuity::continuity;
/// use stratum_eval::EvaluationConfig;
///
/// let annotations: Vec<f64> = (10..=40).map(|i| i as f64 / 2.0).collect();
/// let result = continuity(&annotations, &annotations, &EvaluationConfig::default());
/// assert_eq!(result.cml_c, 100.0);
/// assert_eq!(result.aml_t, 100.0);
/// ```
pub fn continuity(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> ContinuityResult {
    continuity_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!(
            "Continuity: {}, assigning zero to all outputs [cmlC, cmlT, amlC, amlT]",
            rejection
        );
        ContinuityResult::default()
    })
}

/// Like [`continuity`], but reports why a pair was not scored
pub fn continuity_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<ContinuityResult, Rejection> {
    let pair = prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 2,
            max_event_time: config.max_event_time,
        },
    )?;

    log::debug!(
        "Continuity: {} annotations, {} estimates",
        pair.annotations.len(),
        pair.estimates.len()
    );

    let thresholds = ContinuityThresholds {
        phase: config.continuity_phase_threshold,
        period: config.continuity_period_threshold,
    };
    let variants = MetricalVariants::from_annotations(&pair.annotations);
    let accuracies: Vec<SequenceAccuracy> = variants
        .as_array()
        .iter()
        .map(|variant| sequence_accuracy(variant, &pair.estimates, thresholds))
        .collect();

    let correct_level = accuracies[0];
    let result = ContinuityResult {
        cml_c: correct_level.continuous,
        cml_t: correct_level.total,
        aml_c: accuracies.iter().map(|a| a.continuous).fold(0.0, f64::max),
        aml_t: accuracies.iter().map(|a| a.total).fold(0.0, f64::max),
    };

    for (label, accuracy) in MetricalVariants::LABELS.iter().zip(&accuracies) {
        log::debug!(
            "Continuity [{}]: continuous={:.2} total={:.2}",
            label,
            accuracy.continuous,
            accuracy.total
        );
    }
    log::debug!(
        "Continuity: cmlC={:.2} cmlT={:.2} amlC={:.2} amlT={:.2}",
        result.cml_c,
        result.cml_t,
        result.aml_c,
        result.aml_t
    );

    Ok(result)
}

/// Run the continuity state walk over the estimates
///
/// This is the shared engine for beat and downbeat continuity. An annotation
/// can be claimed by at most one estimate. Sequences with fewer than two
/// events give zero accuracy, since no interval can be formed.
pub fn sequence_accuracy(
    annotations: &[f64],
    estimates: &[f64],
    thresholds: ContinuityThresholds,
) -> SequenceAccuracy {
    if annotations.len() < 2 || estimates.len() < 2 {
        return SequenceAccuracy::default();
    }

    let flags = correctness_flags(annotations, estimates, thresholds);
    let correct = flags.iter().filter(|&&ok| ok).count();
    let longest = longest_run(&flags);
    let total = flags.len() as f64;

    SequenceAccuracy {
        total: 100.0 * correct as f64 / total,
        continuous: 100.0 * longest as f64 / total,
    }
}

fn correctness_flags(
    annotations: &[f64],
    estimates: &[f64],
    thresholds: ContinuityThresholds,
) -> Vec<bool> {
    let last_annotation = annotations.len() - 1;
    let last_estimate = estimates.len() - 1;
    let mut claimed = vec![false; annotations.len()];
    let mut flags = Vec::with_capacity(estimates.len());

    for (i, &estimate) in estimates.iter().enumerate() {
        let Some((b, distance)) = nearest_index(annotations, estimate) else {
            flags.push(false);
            continue;
        };

        if claimed[b] {
            flags.push(false);
            continue;
        }

        // First estimate or first annotation: look forward on both sides.
        // Where no forward neighbour exists, fall back to the backward one.
        let look_forward = i == 0 || b == 0;
        let interval = if look_forward && b < last_annotation {
            annotations[b + 1] - annotations[b]
        } else {
            annotations[b] - annotations[b - 1]
        };
        let gap = if look_forward && i < last_estimate {
            estimates[i + 1] - estimates[i]
        } else {
            estimates[i] - estimates[i - 1]
        };

        let phase_ok = (distance / interval).abs() < thresholds.phase;
        let period_ok = (1.0 - gap / interval).abs() < thresholds.period;

        if phase_ok && period_ok {
            claimed[b] = true;
            flags.push(true);
        } else {
            flags.push(false);
        }
    }

    flags
}

/// Length of the longest run of `true`, including a run that reaches the end
fn longest_run(flags: &[bool]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &ok in flags {
        if ok {
            current += 1;
        } else {
            longest = longest.max(current);
            current = 0;
        }
    }
    longest.max(current)
}
