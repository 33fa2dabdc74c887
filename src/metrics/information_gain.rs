//! Information gain from the beat error histogram
//!
//! # Algorithm
//!
//! 1. For every estimate, take the signed error to its nearest annotation as a
//!    fraction of the adjacent inter-annotation interval
//! 2. Quantise the errors to four decimals and wrap them onto the circular
//!    domain [-0.5, 0.5)
//! 3. Histogram the errors; the two half-width edge bins at ±0.5 are the same
//!    circular bin and are folded together
//! 4. Measure the histogram's entropy in bits
//! 5. Repeat with annotations and estimates swapped and keep the worse
//!    (higher) entropy
//!
//! Information gain is `log2(bins)` minus that entropy: a tracker with
//! consistent errors concentrates the histogram and scores high, a tracker
//! unrelated to the annotations spreads it out and scores near zero.
//!
//! # Reference
//!
//! Davies, M. E. P., Degara, N., & Plumbley, M. D. (2011). Measuring the
//! performance of beat tracking algorithms using a beat error histogram.
//! *IEEE Signal Processing Letters*, 18(3), 157-160.

use super::nearest_index;
use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, trim_lead_in, GateSpec, Rejection};
use serde::{Deserialize, Serialize};

/// Information gain with the histogram of the worse-fitting direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationGainResult {
    /// Information gain in bits, between 0 and log2(bins)
    pub information_gain: f64,
    /// Beat error histogram counts over [-0.5, 0.5)
    pub histogram: Vec<f64>,
}

impl InformationGainResult {
    /// Zero bits with a uniform histogram
    ///
    /// Each bin holds `annotations / bins` (after lead-in trimming), so the
    /// histogram is flat even when that is not a whole number.
    pub fn floor(annotations: &[f64], config: &EvaluationConfig) -> Self {
        let bins = config.information_gain_bins.max(1);
        let trimmed = trim_lead_in(annotations, config.min_event_time).len();
        Self {
            information_gain: 0.0,
            histogram: vec![trimmed as f64 / bins as f64; bins],
        }
    }
}

/// Information gain of `estimates` against `annotations`
///
/// Returns [`InformationGainResult::floor`] when either sequence has fewer than
/// two events after lead-in trimming or holds values that are not plausibly
/// seconds.
///
/// # Example
///
/// ```
/// use stratum_eval::metrics::information_gain::information_gain;
/// use stratum_eval::EvaluationConfig;
///
/// let annotations: Vec<f64> = (10..=60).map(|i| i as f64 / 2.0).collect();
/// let result = information_gain(&annotations, &annotations, &EvaluationConfig::default());
/// assert!((result.information_gain - 40f64.log2()).abs() < 1e-9);
/// ```
pub fn information_gain(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> InformationGainResult {
    information_gain_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!(
            "Information gain: {}, assigning zero and a uniform histogram",
            rejection
        );
        InformationGainResult::floor(annotations, config)
    })
}

/// Like [`information_gain`], but reports why a pair was not scored
pub fn information_gain_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<InformationGainResult, Rejection> {
    let pair = prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 2,
            max_event_time: config.max_event_time,
        },
    )?;

    let bins = config.information_gain_bins.max(2);
    let edges = bin_edges(bins);

    let forward = histogram(&relative_errors(&pair.annotations, &pair.estimates), &edges);
    let backward = histogram(&relative_errors(&pair.estimates, &pair.annotations), &edges);
    let forward_entropy = entropy(&forward);
    let backward_entropy = entropy(&backward);

    log::debug!(
        "Information gain: forward entropy {:.4}, backward entropy {:.4} bits",
        forward_entropy,
        backward_entropy
    );

    let (max_entropy, histogram) = if forward_entropy > backward_entropy {
        (forward_entropy, forward)
    } else {
        (backward_entropy, backward)
    };

    Ok(InformationGainResult {
        information_gain: (bins as f64).log2() - max_entropy,
        histogram,
    })
}

/// Wrapped relative error of every `events` entry against its nearest
/// `reference` entry
///
/// Both sequences are sorted into private copies first. `reference` must hold
/// at least two events.
pub fn relative_errors(reference: &[f64], events: &[f64]) -> Vec<f64> {
    if reference.len() < 2 {
        return Vec::new();
    }

    let mut reference = reference.to_vec();
    let mut events = events.to_vec();
    reference.sort_by(|a, b| a.total_cmp(b));
    events.sort_by(|a, b| a.total_cmp(b));
    let last = reference.len() - 1;

    events
        .iter()
        .filter_map(|&event| {
            let (i, _) = nearest_index(&reference, event)?;
            let error = event - reference[i];
            let interval = if i == 0 {
                reference[1] - reference[0]
            } else if i == last || error < 0.0 {
                reference[i] - reference[i - 1]
            } else {
                reference[i + 1] - reference[i]
            };
            let relative = error / interval;
            relative.is_finite().then(|| wrap(quantise(relative)))
        })
        .collect()
}

/// Round to four decimals (ties to even) so values near bin edges are stable
fn quantise(error: f64) -> f64 {
    (error * 10000.0).round_ties_even() / 10000.0
}

/// Map onto the circular domain [-0.5, 0.5)
fn wrap(error: f64) -> f64 {
    (error + 0.5).rem_euclid(1.0) - 0.5
}

/// Bin edges for `bins` circular bins
///
/// There are `bins - 1` full-width bins between two half-width bins centred
/// on -0.5 and +0.5, giving `bins + 2` edges. The right-most bin is closed.
fn bin_edges(bins: usize) -> Vec<f64> {
    let step = 1.0 / (bins as f64 - 1.0);
    let mut centres = Vec::with_capacity(bins + 1);
    centres.push(-0.5);
    centres.extend((0..bins - 1).map(|j| -0.5 + 0.5 * step + j as f64 * step));
    centres.push(0.5);

    let mut edges = Vec::with_capacity(bins + 2);
    edges.push(centres[0] - (centres[0].abs() - centres[1].abs()));
    edges.extend(centres.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])));
    let n = edges.len();
    edges.push(edges[n - 1] + (edges[n - 1] - edges[n - 2]));
    edges
}

/// Counts per circular bin, with the +0.5 edge bin folded into bin 0
fn histogram(errors: &[f64], edges: &[f64]) -> Vec<f64> {
    let raw_bins = edges.len() - 1;
    let mut counts = vec![0.0; raw_bins];
    let (lowest, highest) = (edges[0], edges[raw_bins]);

    for &error in errors {
        if error < lowest || error > highest {
            continue;
        }
        let bin = edges
            .partition_point(|&edge| edge <= error)
            .saturating_sub(1)
            .min(raw_bins - 1);
        counts[bin] += 1.0;
    }

    if let Some(wrapped) = counts.pop() {
        counts[0] += wrapped;
    }
    counts
}

/// Shannon entropy in bits of the normalised histogram
///
/// Empty bins contribute nothing.
fn entropy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    -counts
        .iter()
        .map(|&count| {
            let p = if count > 0.0 { count / total } else { 1.0 };
            p * p.log2()
        })
        .sum::<f64>()
}
