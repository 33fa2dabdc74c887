//! P-score: impulse train cross-correlation
//!
//! # Algorithm
//!
//! 1. Quantise both sequences into 0/1 impulse trains at `p_score_sample_rate`
//!    (each time rounded to the nearest bin)
//! 2. Derive the lag window W from the median inter-annotation interval
//! 3. Cross-correlate the trains over lags -W..=W by direct summation
//! 4. Normalise the summed correlation by the larger impulse count
//!
//! # Reference
//!
//! McKinney, M. F., Moelants, D., Davies, M. E. P., & Klapuri, A. (2007).
//! Evaluation of audio beat tracking and music tempo extraction algorithms.
//! *Journal of New Music Research*, 36(1), 1-16.

use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, Rejection};

/// P-score of `estimates` against `annotations` (0-100)
///
/// Returns 0 when either sequence is empty after lead-in trimming or holds
/// values that are not plausibly seconds.
///
/// # Example
///
/// ```
/// use stratum_eval::metrics::p_score::p_score;
/// use stratum_eval::EvaluationConfig;
///
/// let annotations: Vec<f64> = (10..=40).map(|i| i as f64 / 2.0).collect();
/// let score = p_score(&annotations, &annotations, &EvaluationConfig::default());
/// assert_eq!(score, 100.0);
/// ```
pub fn p_score(annotations: &[f64], estimates: &[f64], config: &EvaluationConfig) -> f64 {
    p_score_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("P-score: {}, assigning zero", rejection);
        0.0
    })
}

/// Like [`p_score`], but reports why a pair was not scored
pub fn p_score_checked(
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

    let sample_rate = config.p_score_sample_rate.max(1) as f64;
    let annotation_bins = impulse_bins(&pair.annotations, sample_rate);
    let estimate_bins = impulse_bins(&pair.estimates, sample_rate);

    let length = annotation_bins
        .iter()
        .chain(&estimate_bins)
        .copied()
        .max()
        .map_or(0, |last| last + 1);
    let annotation_train = impulse_train(&annotation_bins, length);
    let estimate_train = impulse_train(&estimate_bins, length);

    let max_lag = lag_window(&annotation_bins, config.p_score_window);

    log::debug!(
        "P-score: {} annotation bins, {} estimate bins, train length {}, max lag {}",
        annotation_bins.len(),
        estimate_bins.len(),
        length,
        max_lag
    );

    let correlation: f64 = cross_correlation(&estimate_train, &annotation_train, max_lag)
        .iter()
        .sum();
    let impulses = annotation_bins.len().max(estimate_bins.len()) as f64;

    Ok((100.0 * correlation / impulses).min(100.0))
}

/// Sorted, de-duplicated bin indices of the events
fn impulse_bins(events: &[f64], sample_rate: f64) -> Vec<usize> {
    let mut bins: Vec<usize> = events
        .iter()
        .map(|&t| (t * sample_rate).round().max(0.0) as usize)
        .collect();
    bins.sort_unstable();
    bins.dedup();
    bins
}

fn impulse_train(bins: &[usize], length: usize) -> Vec<f64> {
    let mut train = vec![0.0; length];
    for &bin in bins {
        train[bin] = 1.0;
    }
    train
}

/// Lag window in bins: `window` times the median inter-annotation interval
///
/// Fewer than two annotation bins leave no interval, giving a window of 0.
fn lag_window(annotation_bins: &[usize], window: f64) -> usize {
    let mut intervals: Vec<f64> = annotation_bins
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .collect();
    if intervals.is_empty() {
        return 0;
    }
    intervals.sort_by(|a, b| a.total_cmp(b));

    let mid = intervals.len() / 2;
    let median = if intervals.len() % 2 == 0 {
        0.5 * (intervals[mid - 1] + intervals[mid])
    } else {
        intervals[mid]
    };

    (window * median).round_ties_even().max(0.0) as usize
}

/// Cross-correlation of `x1` with `x2` at lags `-max_lag..=max_lag`
///
/// Computed by direct summation over zero-padded copies; entry `j` holds lag
/// `j - max_lag`, i.e. the sum of `x1[n] * x2[n + lag]`.
fn cross_correlation(x1: &[f64], x2: &[f64], max_lag: usize) -> Vec<f64> {
    let len = x1.len();
    let mut padded = vec![0.0; len + 2 * max_lag];
    padded[max_lag..max_lag + x2.len().min(len)].copy_from_slice(&x2[..x2.len().min(len)]);

    (0..=2 * max_lag)
        .map(|j| {
            x1.iter()
                .zip(&padded[j..j + len])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}
