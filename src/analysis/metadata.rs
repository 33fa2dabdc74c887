//! Corpus evaluation metadata

use serde::{Deserialize, Serialize};

/// Bookkeeping for one corpus evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetadata {
    /// Crate version that produced the scores
    pub algorithm_version: String,

    /// Number of file pairs evaluated
    pub file_count: usize,

    /// Names of the metrics that were run
    pub metrics_used: Vec<String>,

    /// Files with at least one metric at its floor value
    pub flagged_files: usize,

    /// Wall-clock time of the run in milliseconds
    pub processing_time_ms: f32,
}

impl Default for EvaluationMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            file_count: 0,
            metrics_used: vec![],
            flagged_files: 0,
            processing_time_ms: 0.0,
        }
    }
}
