//! Goto accuracy: binary tracking test
//!
//! Every interior annotation gets an asymmetric window reaching halfway to
//! each neighbour. A window holding exactly one estimate yields a signed beat
//! error relative to the half-interval on the error's side; an empty or
//! crowded window yields the maximal error of 1.
//!
//! The track passes when a long enough stretch of low-error beats exists and
//! its errors have small mean magnitude and spread. The score is all or
//! nothing: 100 or 0.
//!
//! # Reference
//!
//! Goto, M., & Muraoka, Y. (1997). Issues in evaluating beat tracking
//! systems. *Working Notes of the IJCAI-97 Workshop on Issues in AI and Music*,
//! 9-16.

use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, Rejection};

/// Goto accuracy of `estimates` against `annotations` (100 or 0)
///
/// Returns 0 when either sequence is empty after lead-in trimming or holds
/// values that are not plausibly seconds.
pub fn goto_accuracy(annotations: &[f64], estimates: &[f64], config: &EvaluationConfig) -> f64 {
    goto_accuracy_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("Goto accuracy: {}, assigning zero", rejection);
        0.0
    })
}

/// Like [`goto_accuracy`], but reports why a pair was not scored
pub fn goto_accuracy_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<f64, Rejection> {
    let pair = prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 1,
            max_event_time: config.max_event_time,
        },
    )?;

    let errors = beat_errors(&pair.annotations, &pair.estimates);
    let track = candidate_track(&errors, config.goto_threshold);

    let passed = match track {
        Some(track) if !track.is_empty() => {
            let mean_abs = track.iter().map(|e| e.abs()).sum::<f64>() / track.len() as f64;
            let spread = sample_std(track);
            log::debug!(
                "Goto accuracy: track of {} beats, mean |error| {:.3}, std {:.3}",
                track.len(),
                mean_abs,
                spread
            );
            mean_abs < config.goto_mu && spread < config.goto_sigma
        }
        _ => {
            log::debug!("Goto accuracy: no sufficiently long candidate track");
            false
        }
    };

    Ok(if passed { 100.0 } else { 0.0 })
}

/// Signed beat error per annotation
///
/// The first and last annotations have no two-sided window and keep the
/// maximal error of 1.
pub fn beat_errors(annotations: &[f64], estimates: &[f64]) -> Vec<f64> {
    let n = annotations.len();
    let mut errors = vec![1.0; n];

    for k in 1..n.saturating_sub(1) {
        let pre = 0.5 * (annotations[k] - annotations[k - 1]);
        let post = 0.5 * (annotations[k + 1] - annotations[k]);
        let window_min = annotations[k] - pre;
        let window_max = annotations[k] + post;

        let mut inside = estimates
            .iter()
            .filter(|&&e| e >= window_min && e < window_max);

        if let (Some(&estimate), None) = (inside.next(), inside.next()) {
            let error = estimate - annotations[k];
            errors[k] = if error < 0.0 { error / pre } else { error / post };
        }
    }

    errors
}

/// Stretch of beat errors the pass/fail statistics are taken over
///
/// With fewer than three over-threshold errors (none at all included) the
/// whole interior is the candidate. Otherwise the candidate is the run from
/// one over-threshold error to the next one furthest from it, both bounding
/// errors included, provided the errors strictly between them cover more
/// than a quarter of the interior. `None` means no candidate qualifies.
pub fn candidate_track(errors: &[f64], threshold: f64) -> Option<&[f64]> {
    let over: Vec<usize> = errors
        .iter()
        .enumerate()
        .filter(|(_, e)| e.abs() > threshold)
        .map(|(i, _)| i)
        .collect();

    if over.len() < 3 {
        let end = errors.len().saturating_sub(1);
        return Some(errors.get(1..end).unwrap_or(&[]));
    }

    let (start, gap) = over
        .windows(2)
        .map(|pair| (pair[0], pair[1] - pair[0]))
        .fold((0, 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    let interior = errors.len().saturating_sub(2) as f64;
    if (gap - 1) as f64 > 0.25 * interior {
        Some(&errors[start..=start + gap])
    } else {
        None
    }
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_second_grid() -> Vec<f64> {
        (10..=120).map(|i| i as f64 / 2.0).collect()
    }

    #[test]
    fn test_identical_sequences() {
        let beats = half_second_grid();
        assert_eq!(goto_accuracy(&beats, &beats, &EvaluationConfig::default()), 100.0);
    }

    #[test]
    fn test_three_identical_points_pass() {
        let beats = [6.0, 7.0, 8.0];
        assert_eq!(goto_accuracy(&beats, &beats, &EvaluationConfig::default()), 100.0);
    }

    #[test]
    fn test_empty_sequences_score_zero() {
        let config = EvaluationConfig::default();
        let beats = half_second_grid();
        assert_eq!(goto_accuracy(&beats, &[], &config), 0.0);
        assert_eq!(goto_accuracy(&[], &beats, &config), 0.0);
    }

    #[test]
    fn test_no_over_threshold_errors_is_pass_candidate() {
        let errors = [0.0, 0.05, -0.05, 0.0];
        let track = candidate_track(&errors, 0.35);
        assert_eq!(track, Some(&errors[1..3]));
    }

    #[test]
    fn test_short_error_vectors_do_not_panic() {
        assert_eq!(candidate_track(&[], 0.35), Some(&[][..]));
        assert_eq!(candidate_track(&[0.1], 0.35), Some(&[][..]));
        assert_eq!(candidate_track(&[1.0, 1.0], 0.35), Some(&[][..]));
    }

    #[test]
    fn test_beat_errors_relative_to_half_interval() {
        let annotations = [6.0, 7.0, 9.0, 9.5];
        // Both estimates are 0.1 s late; the following half-intervals are
        // 1 s and 0.25 s
        let estimates = [7.1, 9.1];
        let errors = beat_errors(&annotations, &estimates);
        assert_eq!(errors[0], 1.0);
        assert!((errors[1] - 0.1).abs() < 1e-9, "{:?}", errors);
        assert!((errors[2] - 0.4).abs() < 1e-9, "{:?}", errors);
        assert_eq!(errors[3], 1.0);
    }

    #[test]
    fn test_crowded_window_is_maximal_error() {
        let annotations = [6.0, 7.0, 8.0];
        let errors = beat_errors(&annotations, &[6.95, 7.05]);
        assert_eq!(errors[1], 1.0);
    }

    #[test]
    fn test_long_correct_stretch_passes() {
        let config = EvaluationConfig::default();
        let annotations = half_second_grid();
        // Lose the first fifth of the track, then track perfectly
        let estimates: Vec<f64> = annotations
            .iter()
            .enumerate()
            .map(|(i, &t)| if i < annotations.len() / 5 { t + 0.25 } else { t })
            .collect();
        assert_eq!(goto_accuracy(&annotations, &estimates, &config), 100.0);
    }

    #[test]
    fn test_scattered_errors_fail() {
        let config = EvaluationConfig::default();
        let annotations = half_second_grid();
        // Every fourth beat is off by more than the threshold
        let estimates: Vec<f64> = annotations
            .iter()
            .enumerate()
            .map(|(i, &t)| if i % 4 == 0 { t + 0.2 } else { t })
            .collect();
        assert_eq!(goto_accuracy(&annotations, &estimates, &config), 0.0);
    }

    #[test]
    fn test_consistent_bias_fails_mean_condition() {
        let config = EvaluationConfig::default();
        let annotations = half_second_grid();
        // 0.06 s late is 0.24 of the half-interval: under the threshold but
        // above the mean bound
        let estimates: Vec<f64> = annotations.iter().map(|t| t + 0.06).collect();
        assert_eq!(goto_accuracy(&annotations, &estimates, &config), 0.0);
    }

    #[test]
    fn test_candidate_track_includes_bounding_errors() {
        let errors = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        let track = candidate_track(&errors, 0.35).unwrap();
        assert_eq!(track, &errors[1..=7]);
    }

    #[test]
    fn test_short_stretch_with_bounding_errors_fails() {
        // Nine correct beats out of 23: the stretch qualifies on length, but
        // the two over-threshold errors that bound it pull the mean to 0.2
        let annotations: Vec<f64> = (0..23).map(|i| 6.0 + 0.5 * i as f64).collect();
        let estimates = &annotations[1..=8];
        assert_eq!(
            goto_accuracy(&annotations, estimates, &EvaluationConfig::default()),
            0.0
        );
    }
}
