//! Bootstrap confidence intervals over per-file scores
//!
//! Resamples the scores with replacement, takes the mean of every resample and
//! reads the interval bounds off the sorted means.
//!
//! Resamples are drawn in parallel. Resample `s` uses its own ChaCha8 stream
//! of the seeded generator, so a fixed seed gives the same interval whatever
//! the thread count.
//!
//! # Reference
//!
//! Efron, B., & Tibshirani, R. J. (1993). *An Introduction to the Bootstrap*.
//! Chapman & Hall.
//!
//! # Example
//!
//! ```
//! use stratum_eval::analysis::bootstrap::bootstrap_confidence_interval;
//!
//! let scores = [62.0, 71.5, 80.0, 55.0, 90.0, 77.0];
//! let ci = bootstrap_confidence_interval(&scores, 1000, 0.95, Some(7))?;
//! assert!(ci.lower <= ci.upper);
//! # Ok::<(), stratum_eval::EvaluationError>(())
//! ```

use crate::error::EvaluationError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Lower and upper bound of a bootstrap confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Distance between the bounds
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Bootstrap confidence interval of the mean of `scores`
///
/// # Arguments
///
/// * `scores` - Per-file scores of one metric
/// * `samples` - Number of resamples (typically 1000)
/// * `interval` - Coverage in (0, 1), e.g. 0.95
/// * `seed` - Seed for reproducible resampling; `None` draws one from entropy
///
/// # Errors
///
/// Returns `EvaluationError::InvalidInput` if `scores` is empty, `samples`
/// is zero or `interval` lies outside (0, 1).
pub fn bootstrap_confidence_interval(
    scores: &[f64],
    samples: usize,
    interval: f64,
    seed: Option<u64>,
) -> Result<ConfidenceInterval, EvaluationError> {
    if scores.is_empty() {
        return Err(EvaluationError::InvalidInput(
            "cannot bootstrap an empty score list".to_string(),
        ));
    }
    if samples == 0 {
        return Err(EvaluationError::InvalidInput(
            "number of bootstrap samples must be non-zero".to_string(),
        ));
    }
    if !(interval > 0.0 && interval < 1.0) {
        return Err(EvaluationError::InvalidInput(format!(
            "confidence interval must lie in (0, 1), got {}",
            interval
        )));
    }

    let seed = seed.unwrap_or_else(rand::random);
    log::debug!(
        "Bootstrap: {} scores, {} resamples, interval {:.3}, seed {}",
        scores.len(),
        samples,
        interval,
        seed
    );

    let n = scores.len();
    let mut means: Vec<f64> = (0..samples as u64)
        .into_par_iter()
        .map(|stream| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(stream);
            let total: f64 = (0..n).map(|_| scores[rng.gen_range(0..n)]).sum();
            total / n as f64
        })
        .collect();
    means.sort_by(|a, b| a.total_cmp(b));

    let count = samples as f64;
    let last = samples - 1;
    let lower_index = ((count * (1.0 - interval) / 2.0).ceil() as usize).min(last);
    let upper_index =
        ((count * interval + count * (1.0 - interval) / 2.0).ceil() as usize).min(last);

    Ok(ConfidenceInterval {
        lower: means[lower_index],
        upper: means[upper_index],
    })
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic scores with a fixed spread around 50
    fn spread_scores(n: usize) -> Vec<f64> {
        (0..n).map(|i| 50.0 + 20.0 * (((i * 7919) % 101) as f64 / 100.0 - 0.5)).collect()
    }

    #[test]
    fn test_bounds_bracket_mean() {
        let scores = spread_scores(60);
        let ci = bootstrap_confidence_interval(&scores, 1000, 0.95, Some(1)).unwrap();
        let m = mean(&scores);
        assert!(ci.lower <= m && m <= ci.upper, "{:?} vs mean {}", ci, m);
    }

    #[test]
    fn test_width_shrinks_with_more_scores() {
        let small = bootstrap_confidence_interval(&spread_scores(10), 1000, 0.95, Some(3)).unwrap();
        let large = bootstrap_confidence_interval(&spread_scores(400), 1000, 0.95, Some(3)).unwrap();
        assert!(large.width() < small.width(), "{:?} vs {:?}", large, small);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let scores = spread_scores(25);
        let a = bootstrap_confidence_interval(&scores, 500, 0.9, Some(42)).unwrap();
        let b = bootstrap_confidence_interval(&scores, 500, 0.9, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_scores_give_degenerate_interval() {
        let ci = bootstrap_confidence_interval(&[80.0; 12], 200, 0.95, None).unwrap();
        assert_eq!(ci.lower, 80.0);
        assert_eq!(ci.upper, 80.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(bootstrap_confidence_interval(&[], 1000, 0.95, Some(1)).is_err());
        assert!(bootstrap_confidence_interval(&[1.0], 0, 0.95, Some(1)).is_err());
        assert!(bootstrap_confidence_interval(&[1.0], 1000, 1.0, Some(1)).is_err());
        assert!(bootstrap_confidence_interval(&[1.0], 1000, 0.0, Some(1)).is_err());
    }

    #[test]
    fn test_upper_index_clamped() {
        // A tiny resample count pushes the upper index past the end
        let ci = bootstrap_confidence_interval(&[1.0, 2.0, 3.0], 1, 0.95, Some(5)).unwrap();
        assert_eq!(ci.lower, ci.upper);
    }
}
