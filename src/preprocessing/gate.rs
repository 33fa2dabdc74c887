//! Lead-in trimming and validity checks
//!
//! Every scorer runs its inputs through [`prepare`] first. Events before the
//! configured minimum time are dropped from both sequences, then the pair is
//! rejected if either side is too short or holds values that cannot be
//! seconds. A rejection is not an error: the caller maps it to the metric's
//! floor value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a sequence pair was not scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// Fewer estimated events than the metric needs
    TooFewEstimates {
        /// Events left after trimming
        found: usize,
        /// Minimum events required
        required: usize,
    },

    /// Fewer annotated events than the metric needs
    TooFewAnnotations {
        /// Events left after trimming
        found: usize,
        /// Minimum events required
        required: usize,
    },

    /// The largest event time exceeds the plausibility bound
    ImplausibleTimes {
        /// Largest event time seen
        max_time: f64,
        /// Bound that was exceeded
        bound: f64,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooFewEstimates { found, required } => write!(
                f,
                "estimate sequence is empty or too short ({} events, need {})",
                found, required
            ),
            Rejection::TooFewAnnotations { found, required } => write!(
                f,
                "annotation sequence is empty or too short ({} events, need {})",
                found, required
            ),
            Rejection::ImplausibleTimes { max_time, bound } => write!(
                f,
                "event time {:.3} exceeds {:.0}; times do not look like seconds",
                max_time, bound
            ),
        }
    }
}

/// Validity requirements for one metric family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSpec {
    /// Events before this time are dropped
    pub min_event_time: f64,
    /// Minimum events required in each sequence after trimming
    pub min_events: usize,
    /// Largest event time accepted as seconds
    pub max_event_time: f64,
}

/// A trimmed sequence pair that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPair {
    /// Ground-truth events at or after the minimum time
    pub annotations: Vec<f64>,
    /// Estimated events at or after the minimum time
    pub estimates: Vec<f64>,
}

/// Drop events earlier than `min_time`, keeping the original order
pub fn trim_lead_in(events: &[f64], min_time: f64) -> Vec<f64> {
    events.iter().copied().filter(|&t| t >= min_time).collect()
}

/// Trim both sequences and check them against `spec`
///
/// Estimates are checked before annotations, then the plausibility bound.
///
/// # Errors
///
/// Returns the first [`Rejection`] that applies.
pub fn prepare(
    annotations: &[f64],
    estimates: &[f64],
    spec: GateSpec,
) -> Result<PreparedPair, Rejection> {
    let annotations = trim_lead_in(annotations, spec.min_event_time);
    let estimates = trim_lead_in(estimates, spec.min_event_time);

    if estimates.len() < spec.min_events {
        return Err(Rejection::TooFewEstimates {
            found: estimates.len(),
            required: spec.min_events,
        });
    }
    if annotations.len() < spec.min_events {
        return Err(Rejection::TooFewAnnotations {
            found: annotations.len(),
            required: spec.min_events,
        });
    }

    let max_time = max_event(&annotations).max(max_event(&estimates));
    if max_time > spec.max_event_time {
        return Err(Rejection::ImplausibleTimes {
            max_time,
            bound: spec.max_event_time,
        });
    }

    Ok(PreparedPair {
        annotations,
        estimates,
    })
}

fn max_event(events: &[f64]) -> f64 {
    events.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
