//! Evaluation result types

use crate::metrics::continuity::ContinuityResult;
use crate::metrics::f_measure::FMeasureResult;
use crate::metrics::information_gain::InformationGainResult;
use crate::metrics::{MetricKind, MetricScore};
use crate::preprocessing::gate::Rejection;
use serde::{Deserialize, Serialize};

/// A metric that fell back to its floor value, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFlag {
    /// Metric that was not scored
    pub metric: MetricKind,
    /// Reason given by the validity gate
    pub rejection: Rejection,
}

/// Scores of one estimate sequence against one annotation sequence
///
/// Metrics that were not requested are `None`. Metrics that were requested
/// but rejected by the validity gate hold their floor value and get an entry
/// in `flags`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatEvaluation {
    /// F-measure, precision, recall and accuracy
    pub f_measure: Option<FMeasureResult>,

    /// Cemgil accuracy (0-100)
    pub cemgil: Option<f64>,

    /// Goto accuracy (100 or 0)
    pub goto: Option<f64>,

    /// P-score (0-100)
    pub p_score: Option<f64>,

    /// CMLc, CMLt, AMLc, AMLt
    pub continuity: Option<ContinuityResult>,

    /// Information gain in bits with the beat error histogram
    pub information_gain: Option<InformationGainResult>,

    /// Cemgil accuracy at allowed metrical levels (0-100)
    pub aml_cemgil: Option<f64>,

    /// Metrics that fell back to their floor value
    pub flags: Vec<EvaluationFlag>,
}

impl BeatEvaluation {
    /// Store one metric's score
    pub fn record(&mut self, kind: MetricKind, score: MetricScore) {
        match (kind, score) {
            (MetricKind::FMeasure, MetricScore::FMeasure(result)) => self.f_measure = Some(result),
            (MetricKind::Continuity, MetricScore::Continuity(result)) => {
                self.continuity = Some(result)
            }
            (MetricKind::InformationGain, MetricScore::InformationGain(result)) => {
                self.information_gain = Some(result)
            }
            (MetricKind::Cemgil, MetricScore::Percentage(value)) => self.cemgil = Some(value),
            (MetricKind::Goto, MetricScore::Percentage(value)) => self.goto = Some(value),
            (MetricKind::PScore, MetricScore::Percentage(value)) => self.p_score = Some(value),
            (MetricKind::AmlCemgil, MetricScore::Percentage(value)) => {
                self.aml_cemgil = Some(value)
            }
            (kind, score) => {
                log::warn!("{}: unexpected score shape {:?}, ignoring", kind, score);
            }
        }
    }

    /// Named scalar scores of every metric that was computed
    ///
    /// Keys follow [`MetricKind::score_keys`], in [`MetricKind::ALL`] order.
    pub fn scores(&self) -> Vec<(&'static str, f64)> {
        let mut scores = Vec::new();
        if let Some(result) = &self.f_measure {
            scores.push(("fMeasure", result.f_measure));
        }
        if let Some(value) = self.cemgil {
            scores.push(("cemgilAcc", value));
        }
        if let Some(value) = self.goto {
            scores.push(("gotoAcc", value));
        }
        if let Some(value) = self.p_score {
            scores.push(("pScore", value));
        }
        if let Some(result) = &self.continuity {
            scores.extend([
                ("cmlC", result.cml_c),
                ("cmlT", result.cml_t),
                ("amlC", result.aml_c),
                ("amlT", result.aml_t),
            ]);
        }
        if let Some(result) = &self.information_gain {
            scores.push(("infoGain", result.information_gain));
        }
        if let Some(value) = self.aml_cemgil {
            scores.push(("amlCem", value));
        }
        scores
    }

    /// Whether any requested metric fell back to its floor
    pub fn has_flags(&self) -> bool {
        !self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_scores_order() {
        let mut evaluation = BeatEvaluation::default();
        evaluation.record(MetricKind::AmlCemgil, MetricScore::Percentage(90.0));
        evaluation.record(
            MetricKind::FMeasure,
            MetricScore::FMeasure(FMeasureResult::from_counts(3, 1, 0)),
        );
        evaluation.record(
            MetricKind::Continuity,
            MetricScore::Continuity(ContinuityResult {
                cml_c: 50.0,
                cml_t: 60.0,
                aml_c: 70.0,
                aml_t: 80.0,
            }),
        );

        let keys: Vec<&str> = evaluation.scores().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["fMeasure", "cmlC", "cmlT", "amlC", "amlT", "amlCem"]);
        assert_eq!(evaluation.cemgil, None);
    }

    #[test]
    fn test_mismatched_score_is_ignored() {
        let mut evaluation = BeatEvaluation::default();
        evaluation.record(MetricKind::FMeasure, MetricScore::Percentage(50.0));
        assert_eq!(evaluation, BeatEvaluation::default());
    }
}
