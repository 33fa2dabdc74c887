//! Beat tracking evaluation metrics
//!
//! Every scorer takes borrowed annotation and estimate slices plus an
//! [`EvaluationConfig`] and is total: a degenerate pair yields the metric's
//! floor value, never a panic or an error. Each scorer also has a `*_checked`
//! form that reports the [`Rejection`] instead.
//!
//! - [`f_measure`]: windowed hit counting
//! - [`cemgil`]: Gaussian proximity, plus its allowed-metrical-level variant
//! - [`p_score`]: impulse train cross-correlation
//! - [`continuity`]: CMLc, CMLt, AMLc, AMLt
//! - [`goto`]: binary tracking test
//! - [`information_gain`]: beat error histogram entropy
//! - [`downbeat`]: continuity engine applied to downbeats

pub mod cemgil;
pub mod continuity;
pub mod downbeat;
pub mod f_measure;
pub mod goto;
pub mod information_gain;
pub mod p_score;

use crate::config::EvaluationConfig;
use crate::error::EvaluationError;
use crate::preprocessing::gate::Rejection;
use continuity::ContinuityResult;
use f_measure::FMeasureResult;
use information_gain::InformationGainResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index and absolute distance of the event nearest to `t`
///
/// Ties go to the earlier event. Returns `None` for an empty slice.
pub(crate) fn nearest_index(events: &[f64], t: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &event) in events.iter().enumerate() {
        let distance = (event - t).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }
    best
}

/// The beat metrics a corpus run can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    /// F-measure with precision, recall and accuracy
    FMeasure,
    /// Cemgil accuracy
    Cemgil,
    /// Goto accuracy
    Goto,
    /// P-score
    PScore,
    /// CMLc, CMLt, AMLc and AMLt
    Continuity,
    /// Information gain with its beat error histogram
    InformationGain,
    /// Cemgil accuracy at allowed metrical levels
    AmlCemgil,
}

/// Scorer signature shared by every [`MetricKind`]
pub type Scorer = fn(&[f64], &[f64], &EvaluationConfig) -> Result<MetricScore, Rejection>;

impl MetricKind {
    /// Every metric, in reporting order
    pub const ALL: [MetricKind; 7] = [
        MetricKind::FMeasure,
        MetricKind::Cemgil,
        MetricKind::Goto,
        MetricKind::PScore,
        MetricKind::Continuity,
        MetricKind::InformationGain,
        MetricKind::AmlCemgil,
    ];

    /// Selection name of the metric
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::FMeasure => "fMeasure",
            MetricKind::Cemgil => "cemgilAcc",
            MetricKind::Goto => "gotoAcc",
            MetricKind::PScore => "pScore",
            MetricKind::Continuity => "continuity",
            MetricKind::InformationGain => "infoGain",
            MetricKind::AmlCemgil => "amlCem",
        }
    }

    /// Keys of the scalar scores this metric contributes to a score table
    pub fn score_keys(self) -> &'static [&'static str] {
        match self {
            MetricKind::FMeasure => &["fMeasure"],
            MetricKind::Cemgil => &["cemgilAcc"],
            MetricKind::Goto => &["gotoAcc"],
            MetricKind::PScore => &["pScore"],
            MetricKind::Continuity => &["cmlC", "cmlT", "amlC", "amlT"],
            MetricKind::InformationGain => &["infoGain"],
            MetricKind::AmlCemgil => &["amlCem"],
        }
    }

    /// Parse a metric selection
    ///
    /// `"all"` anywhere in the list selects every metric. Duplicates are
    /// dropped and the result is in [`MetricKind::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::InvalidInput` for an unknown name or an empty
    /// selection.
    pub fn parse_selection<S: AsRef<str>>(names: &[S]) -> Result<Vec<MetricKind>, EvaluationError> {
        if names.is_empty() {
            return Err(EvaluationError::InvalidInput(
                "no metrics selected".to_string(),
            ));
        }

        let mut selected = Vec::with_capacity(Self::ALL.len());
        for name in names {
            let name = name.as_ref().trim();
            if name == "all" {
                return Ok(Self::ALL.to_vec());
            }
            selected.push(name.parse::<MetricKind>()?);
        }

        Ok(Self::ALL
            .iter()
            .copied()
            .filter(|kind| selected.contains(kind))
            .collect())
    }

    /// The scoring function for this metric
    pub fn scorer(self) -> Scorer {
        match self {
            MetricKind::FMeasure => score_f_measure,
            MetricKind::Cemgil => score_cemgil,
            MetricKind::Goto => score_goto,
            MetricKind::PScore => score_p_score,
            MetricKind::Continuity => score_continuity,
            MetricKind::InformationGain => score_information_gain,
            MetricKind::AmlCemgil => score_aml_cemgil,
        }
    }

    /// Value reported when a pair is rejected
    ///
    /// Only information gain depends on the input: its floor is a uniform
    /// histogram sized by the trimmed annotations.
    pub fn floor(self, annotations: &[f64], config: &EvaluationConfig) -> MetricScore {
        match self {
            MetricKind::FMeasure => MetricScore::FMeasure(FMeasureResult::default()),
            MetricKind::Continuity => MetricScore::Continuity(ContinuityResult::default()),
            MetricKind::InformationGain => MetricScore::InformationGain(
                InformationGainResult::floor(annotations, config),
            ),
            _ => MetricScore::Percentage(0.0),
        }
    }
}

fn score_f_measure(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    f_measure::f_measure_checked(a, e, c).map(MetricScore::FMeasure)
}

fn score_cemgil(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    cemgil::cemgil_accuracy_checked(a, e, c).map(MetricScore::Percentage)
}

fn score_goto(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    goto::goto_accuracy_checked(a, e, c).map(MetricScore::Percentage)
}

fn score_p_score(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    p_score::p_score_checked(a, e, c).map(MetricScore::Percentage)
}

fn score_continuity(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    continuity::continuity_checked(a, e, c).map(MetricScore::Continuity)
}

fn score_information_gain(
    a: &[f64],
    e: &[f64],
    c: &EvaluationConfig,
) -> Result<MetricScore, Rejection> {
    information_gain::information_gain_checked(a, e, c).map(MetricScore::InformationGain)
}

fn score_aml_cemgil(a: &[f64], e: &[f64], c: &EvaluationConfig) -> Result<MetricScore, Rejection> {
    cemgil::aml_cemgil_accuracy_checked(a, e, c).map(MetricScore::Percentage)
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                EvaluationError::InvalidInput(format!(
                    "unknown metric '{}' (expected one of: all, {})",
                    s,
                    Self::ALL.map(MetricKind::name).join(", ")
                ))
            })
    }
}

/// Result of one metric on one file pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricScore {
    /// A single percentage
    Percentage(f64),
    /// F-measure with its components
    FMeasure(FMeasureResult),
    /// The four continuity scores
    Continuity(ContinuityResult),
    /// Information gain in bits with the beat error histogram
    InformationGain(InformationGainResult),
}

impl MetricScore {
    /// Scalar values in the order of [`MetricKind::score_keys`]
    pub fn values(&self) -> Vec<f64> {
        match self {
            MetricScore::Percentage(value) => vec![*value],
            MetricScore::FMeasure(result) => vec![result.f_measure],
            MetricScore::Continuity(result) => {
                vec![result.cml_c, result.cml_t, result.aml_c, result.aml_t]
            }
            MetricScore::InformationGain(result) => vec![result.information_gain],
        }
    }
}

/// Run one metric, falling back to its floor on rejection
///
/// The rejection, if any, is returned alongside the floor so callers can
/// surface it.
pub fn evaluate_metric(
    kind: MetricKind,
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> (MetricScore, Option<Rejection>) {
    run_scorer(kind, kind.scorer(), annotations, estimates, config)
}

/// Run an already resolved scorer, falling back to the floor of `kind`
pub(crate) fn run_scorer(
    kind: MetricKind,
    scorer: Scorer,
    annotations: &[f64],
    estimates: &[f64],
    config: &EvaluationConfig,
) -> (MetricScore, Option<Rejection>) {
    match scorer(annotations, estimates, config) {
        Ok(score) => (score, None),
        Err(rejection) => {
            log::warn!("{}: {}, assigning floor value", kind, rejection);
            (kind.floor(annotations, config), Some(rejection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_index_prefers_first_on_tie() {
        assert_eq!(nearest_index(&[], 1.0), None);
        assert_eq!(nearest_index(&[1.0, 3.0], 2.0), Some((0, 1.0)));
        assert_eq!(nearest_index(&[1.0, 3.0, 4.0], 3.9).map(|(i, _)| i), Some(2));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(MetricKind::parse_selection(&["all"]).unwrap(), MetricKind::ALL.to_vec());
        assert_eq!(
            MetricKind::parse_selection(&["amlCem", "fMeasure", "amlCem"]).unwrap(),
            vec![MetricKind::FMeasure, MetricKind::AmlCemgil]
        );
        assert!(MetricKind::parse_selection(&["fmeasure"]).is_err());
        assert!(MetricKind::parse_selection::<&str>(&[]).is_err());
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.name().parse::<MetricKind>().unwrap(), kind);
            assert_eq!(kind.score_keys().len(), kind.floor(&[], &EvaluationConfig::default()).values().len());
        }
    }

    #[test]
    fn test_evaluate_metric_reports_rejection() {
        let config = EvaluationConfig::default();
        let annotations: Vec<f64> = (10..=40).map(|i| i as f64 / 2.0).collect();

        let (score, rejection) = evaluate_metric(MetricKind::Goto, &annotations, &[], &config);
        assert_eq!(score, MetricScore::Percentage(0.0));
        assert!(matches!(rejection, Some(Rejection::TooFewEstimates { .. })));

        let (score, rejection) =
            evaluate_metric(MetricKind::Continuity, &annotations, &annotations, &config);
        assert!(rejection.is_none());
        assert_eq!(score.values(), vec![100.0; 4]);
    }
}
