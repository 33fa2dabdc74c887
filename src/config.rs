//! Configuration parameters for beat tracking evaluation

use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};

/// Evaluation configuration parameters
///
/// One immutable value is passed by reference into every scorer. The defaults
/// are the standard values used in the beat tracking literature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    // Preprocessing
    /// Events earlier than this time (seconds) are ignored (default: 5.0)
    ///
    /// Excludes the lead-in, where annotators and trackers often disagree.
    pub min_event_time: f64,

    /// Plausibility bound for beat times in seconds (default: 5000.0)
    /// A larger value means the sequence was most likely given in samples
    pub max_event_time: f64,

    /// Plausibility bound used by downbeat evaluation (default: 44100.0)
    pub downbeat_max_event_time: f64,

    // F-measure
    /// Half-width of the tolerance window in seconds (default: 0.07)
    pub f_measure_window: f64,

    // Cemgil
    /// Standard deviation of the Gaussian error function in seconds (default: 0.04)
    pub cemgil_sigma: f64,

    // P-score
    /// Cross-correlation range as a fraction of the median inter-annotation
    /// interval (default: 0.2)
    pub p_score_window: f64,

    /// Impulse train sample rate in Hz (default: 100, i.e. 10 ms bins)
    pub p_score_sample_rate: u32,

    // Goto
    /// Maximum allowed relative beat error (default: 0.35)
    pub goto_threshold: f64,

    /// Maximum allowed mean absolute beat error (default: 0.2)
    pub goto_mu: f64,

    /// Maximum allowed standard deviation of the beat error (default: 0.2)
    pub goto_sigma: f64,

    // Continuity
    /// Phase tolerance as a fraction of the local inter-annotation interval (default: 0.175)
    pub continuity_phase_threshold: f64,

    /// Period tolerance as a fraction of the local inter-annotation interval (default: 0.175)
    pub continuity_period_threshold: f64,

    // Information gain
    /// Number of beat error histogram bins (default: 40)
    pub information_gain_bins: usize,

    // Downbeats
    /// Beats per bar used to build downbeat interpretations (default: 4)
    pub beats_per_bar: usize,

    // Bootstrap
    /// Number of bootstrap resamples (default: 1000)
    pub bootstrap_samples: usize,

    /// Confidence interval coverage (default: 0.95)
    pub confidence_interval: f64,

    /// Seed for bootstrap resampling (default: None = seeded from entropy)
    pub bootstrap_seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            min_event_time: 5.0,
            max_event_time: 5000.0,
            downbeat_max_event_time: 44100.0,
            f_measure_window: 0.07,
            cemgil_sigma: 0.04,
            p_score_window: 0.2,
            p_score_sample_rate: 100,
            goto_threshold: 0.35,
            goto_mu: 0.2,
            goto_sigma: 0.2,
            continuity_phase_threshold: 0.175,
            continuity_period_threshold: 0.175,
            information_gain_bins: 40,
            beats_per_bar: 4,
            bootstrap_samples: 1000,
            confidence_interval: 0.95,
            bootstrap_seed: None,
        }
    }
}

impl EvaluationConfig {
    /// Check that every parameter is usable by the scorers
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        let positive = [
            ("max_event_time", self.max_event_time),
            ("downbeat_max_event_time", self.downbeat_max_event_time),
            ("f_measure_window", self.f_measure_window),
            ("cemgil_sigma", self.cemgil_sigma),
            ("p_score_window", self.p_score_window),
            ("goto_threshold", self.goto_threshold),
            ("goto_mu", self.goto_mu),
            ("goto_sigma", self.goto_sigma),
            ("continuity_phase_threshold", self.continuity_phase_threshold),
            ("continuity_period_threshold", self.continuity_period_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EvaluationError::InvalidInput(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        if !self.min_event_time.is_finite() || self.min_event_time < 0.0 {
            return Err(EvaluationError::InvalidInput(format!(
                "min_event_time must be non-negative, got {}",
                self.min_event_time
            )));
        }
        if self.p_score_sample_rate == 0 {
            return Err(EvaluationError::InvalidInput(
                "p_score_sample_rate must be non-zero".to_string(),
            ));
        }
        if self.information_gain_bins < 3 {
            return Err(EvaluationError::InvalidInput(format!(
                "information_gain_bins must be at least 3, got {}",
                self.information_gain_bins
            )));
        }
        if self.beats_per_bar == 0 {
            return Err(EvaluationError::InvalidInput(
                "beats_per_bar must be non-zero".to_string(),
            ));
        }
        if self.bootstrap_samples == 0 {
            return Err(EvaluationError::InvalidInput(
                "bootstrap_samples must be non-zero".to_string(),
            ));
        }
        if !(self.confidence_interval > 0.0 && self.confidence_interval < 1.0) {
            return Err(EvaluationError::InvalidInput(format!(
                "confidence_interval must lie in (0, 1), got {}",
                self.confidence_interval
            )));
        }
        Ok(())
    }

    /// Phase and period tolerance used for downbeats: one sixteenth of a bar
    pub fn downbeat_threshold(&self) -> f64 {
        1.0 / (self.beats_per_bar as f64 * 4.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EvaluationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let config = EvaluationConfig {
            cemgil_sigma: 0.0,
            ..EvaluationConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cemgil_sigma"), "got: {}", err);

        let config = EvaluationConfig {
            confidence_interval: 1.0,
            ..EvaluationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EvaluationConfig {
            information_gain_bins: 2,
            ..EvaluationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_downbeat_threshold_is_sixteenth_of_bar() {
        let config = EvaluationConfig::default();
        assert!((config.downbeat_threshold() - 0.0625).abs() < 1e-12);

        let config = EvaluationConfig {
            beats_per_bar: 3,
            ..EvaluationConfig::default()
        };
        assert!((config.downbeat_threshold() - 1.0 / 12.0).abs() < 1e-12);
    }
}
