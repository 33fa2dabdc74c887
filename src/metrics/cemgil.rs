//! Cemgil accuracy and its allowed-metrical-level variant
//!
//! Every annotation contributes a Gaussian of its distance to the nearest
//! estimate, so small timing jitter costs a little instead of flipping a
//! binary hit into a miss. There is no consumption bookkeeping: one estimate
//! may serve several annotations.
//!
//! # Reference
//!
//! Cemgil, A. T., Kappen, B., Desain, P., & Honing, H. (2001). On tempo
//! tracking: Tempogram representation and Kalman filtering.
//! *Journal of New Music Research*, 28(4), 259-273.

use super::nearest_index;
use crate::config::EvaluationConfig;
use crate::preprocessing::gate::{prepare, GateSpec, PreparedPair, Rejection};
use crate::preprocessing::metrical_variants::MetricalVariants;

/// Cemgil accuracy of `estimates` against `annotations` (0-100)
///
/// Returns 0 when either sequence is empty after lead-in trimming or holds
/// values that are not plausibly seconds.
///
/// # Example
///
/// ```
/// use stratum_eval::metrics::cemgil::cemgil_accuracy;
/// use stratum_eval::EvaluationConfig;
///
/// let annotations: Vec<f64> = (5..=9).map(|t| t as f64).collect();
/// let estimates: Vec<f64> = annotations.iter().map(|t| t + 0.02).collect();
///
/// let score = cemgil_accuracy(&annotations, &estimates, &EvaluationConfig::default());
/// assert!((score - 88.2497).abs() < 1e-3);
/// ```
pub fn cemgil_accuracy(annotations: &[f64], estimates: &[f64], config: &EvaluationConfig) -> f64 {
    cemgil_accuracy_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("Cemgil accuracy: {}, assigning zero", rejection);
        0.0
    })
}

/// Like [`cemgil_accuracy`], but reports why a pair was not scored
pub fn cemgil_accuracy_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<f64, Rejection> {
    let pair = gate(annotations, estimates, config)?;
    log::debug!(
        "Cemgil accuracy: {} annotations, {} estimates, sigma={:.3}s",
        pair.annotations.len(),
        pair.estimates.len(),
        config.cemgil_sigma
    );
    Ok(gaussian_proximity(&pair.annotations, &pair.estimates, config.cemgil_sigma))
}

/// Cemgil accuracy at allowed metrical levels (0-100)
///
/// Scores the estimates against the original annotations, the off-beats,
/// double tempo and both half-tempo rewrites, and keeps the best.
pub fn aml_cemgil_accuracy(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> f64 {
    aml_cemgil_accuracy_checked(annotations, estimates, config).unwrap_or_else(|rejection| {
        log::warn!("AML Cemgil accuracy: {}, assigning zero", rejection);
        0.0
    })
}

/// Like [`aml_cemgil_accuracy`], but reports why a pair was not scored
pub fn aml_cemgil_accuracy_checked(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<f64, Rejection> {
    let pair = gate(annotations, estimates, config)?;
    let variants = MetricalVariants::from_annotations(&pair.annotations);

    let (best_label, best) = MetricalVariants::LABELS
        .iter()
        .zip(variants.as_array())
        .map(|(label, variant)| {
            (*label, gaussian_proximity(variant, &pair.estimates, config.cemgil_sigma))
        })
        .fold(("original", 0.0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    log::debug!("AML Cemgil accuracy: best over variants = {:.2} ({})", best, best_label);
    Ok(best)
}

fn gate(
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> Result<PreparedPair, Rejection> {
    prepare(
        annotations,
        estimates,
        GateSpec {
            min_event_time: config.min_event_time,
            min_events: 1,
            max_event_time: config.max_event_time,
        },
    )
}

/// Sum of Gaussian nearest-estimate weights, normalised by the mean length
///
/// An empty annotation variant contributes nothing and scores 0.
fn gaussian_proximity(annotations: &[f64], estimates: &[f64], sigma: f64) -> f64 {
    if annotations.is_empty() || estimates.is_empty() {
        return 0.0;
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let total: f64 = annotations
        .iter()
        .filter_map(|&annotation| nearest_index(estimates, annotation))
        .map(|(_, distance)| (-(distance * distance) / two_sigma_sq).exp())
        .sum();

    let normaliser = 0.5 * (estimates.len() + annotations.len()) as f64;
    100.0 * total / normaliser
}
