//! Domain types for evaluation runs: metrics, boundary points and fits.

use serde::{Deserialize, Serialize};

use crate::common::config::SearchParams;
use crate::data::domain::FeatureDefaults;

/// One evaluated sample: what the oracle said and what was true.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub probability: f64,
    pub predicted: bool,
    pub actual: bool,
}

impl Observation {
    pub fn new(probability: f64, predicted: bool, actual: bool) -> Self {
        Self {
            probability,
            predicted,
            actual,
        }
    }
}

/// Confusion matrix for a binary classifier.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
}

impl ConfusionCounts {
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, true) => self.false_negative += 1,
            (false, false) => self.true_negative += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    pub fn positives(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    pub fn negatives(&self) -> u64 {
        self.true_negative + self.false_positive
    }

    /// `None` for an empty matrix.
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// `None` when nothing was predicted positive.
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// `None` when there were no actual positives.
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Harmonic mean of precision and recall; undefined parts count as zero.
    pub fn f1(&self) -> f64 {
        let precision = self.precision().unwrap_or(0.0);
        let recall = self.recall().unwrap_or(0.0);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Threshold-based and ranking metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub counts: ConfusionCounts,
    pub accuracy: f64,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: f64,
    /// `None` when only one class is present.
    pub auc: Option<f64>,
}

/// Error magnitude of the predicted probabilities against 0/1 labels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub mse: f64,
    pub rmse: f64,
}

/// Everything the aggregator derives from one pass over the observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub classification: ClassificationMetrics,
    pub error: ErrorMetrics,
}

/// A point where the oracle is ~50% confident.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub probe_value: f64,
    pub boundary_value: f64,
}

/// Boundary points ordered by increasing probe value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundarySet {
    pub points: Vec<BoundaryPoint>,
    /// Probe values for which no crossing was found.
    pub skipped: usize,
}

impl BoundarySet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outcome of bisecting along the free feature for one probe value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    /// Probability landed within tolerance of 0.5.
    Crossing { boundary_value: f64, iterations: u32 },
    /// Search interval shrank below the stop width around a bracketed crossing.
    Narrowed { boundary_value: f64, iterations: u32 },
    /// Iteration budget ran out first, or the oracle stayed on one side of 0.5.
    NoCrossing,
}

impl ProbeOutcome {
    pub fn boundary_value(&self) -> Option<f64> {
        match self {
            ProbeOutcome::Crossing { boundary_value, .. }
            | ProbeOutcome::Narrowed { boundary_value, .. } => Some(*boundary_value),
            ProbeOutcome::NoCrossing => None,
        }
    }
}

/// Least-squares line through the boundary points.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl FitResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// What the boundary looks like once fitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryShape {
    Linear { fit: FitResult, formula: String },
    NonLinear { fit: FitResult },
    Indeterminate { points: usize },
}

/// Which features to probe and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundarySearch {
    /// Feature stepped across its observed range.
    pub probe_feature: String,
    /// Feature bisected for each probe value.
    pub free_feature: String,
    #[serde(default)]
    pub params: SearchParams,
    #[serde(default)]
    pub defaults: FeatureDefaults,
}

impl BoundarySearch {
    pub fn new(probe_feature: impl Into<String>, free_feature: impl Into<String>) -> Self {
        Self {
            probe_feature: probe_feature.into(),
            free_feature: free_feature.into(),
            params: SearchParams::default(),
            defaults: FeatureDefaults::default(),
        }
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_defaults(mut self, defaults: FeatureDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(tp: u64, fp: u64, fn_: u64, tn: u64) -> ConfusionCounts {
        ConfusionCounts {
            true_positive: tp,
            false_positive: fp,
            false_negative: fn_,
            true_negative: tn,
        }
    }

    #[test]
    fn ratios_stay_in_unit_interval() {
        for tp in 0..4 {
            for fp in 0..4 {
                for fn_ in 0..4 {
                    for tn in 0..4 {
                        let c = counts(tp, fp, fn_, tn);
                        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
                        if let Some(a) = c.accuracy() {
                            assert!(in_unit(a));
                        }
                        assert_eq!(c.precision().is_none(), tp + fp == 0);
                        assert_eq!(c.recall().is_none(), tp + fn_ == 0);
                        assert!(c.precision().map_or(true, in_unit));
                        assert!(c.recall().map_or(true, in_unit));
                        assert!(in_unit(c.f1()));
                    }
                }
            }
        }
    }

    #[test]
    fn f1_is_zero_without_true_positives() {
        assert_eq!(counts(0, 3, 2, 5).f1(), 0.0);
        assert_eq!(counts(0, 0, 0, 5).f1(), 0.0);
    }

    #[test]
    fn record_tracks_every_cell() {
        let mut c = ConfusionCounts::default();
        c.record(true, true);
        c.record(true, false);
        c.record(false, true);
        c.record(false, false);
        c.record(false, false);
        assert_eq!(c, counts(1, 1, 1, 2));
        assert_eq!(c.total(), 5);
        assert_eq!(c.positives(), 2);
        assert_eq!(c.negatives(), 3);
    }

    #[test]
    fn search_config_deserialises_with_defaults() {
        let search: BoundarySearch =
            serde_json::from_str(r#"{"probe_feature":"loan_amount","free_feature":"income"}"#)
                .expect("valid search");
        assert_eq!(search.params, SearchParams::default());
        assert!(search.defaults.overrides.is_empty());
    }
}
