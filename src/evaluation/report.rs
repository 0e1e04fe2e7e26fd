//! Evaluation report and its qualitative interpretation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{EvalError, EvalResult};

use super::domain::{BoundaryPoint, BoundaryShape, BoundarySet, MetricSummary};

pub const EXCELLENT_ACCURACY: f64 = 0.85;
pub const GOOD_ACCURACY: f64 = 0.75;
pub const VERY_LOW_MSE: f64 = 0.1;
pub const LOW_MSE: f64 = 0.2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl AccuracyBand {
    pub fn classify(accuracy: f64) -> Self {
        if accuracy > EXCELLENT_ACCURACY {
            AccuracyBand::Excellent
        } else if accuracy > GOOD_ACCURACY {
            AccuracyBand::Good
        } else {
            AccuracyBand::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccuracyBand::Excellent => "excellent",
            AccuracyBand::Good => "good",
            AccuracyBand::NeedsImprovement => "needs improvement",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBand {
    VeryLow,
    Low,
    High,
}

impl ErrorBand {
    pub fn classify(mse: f64) -> Self {
        if mse < VERY_LOW_MSE {
            ErrorBand::VeryLow
        } else if mse < LOW_MSE {
            ErrorBand::Low
        } else {
            ErrorBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorBand::VeryLow => "very low error",
            ErrorBand::Low => "low error",
            ErrorBand::High => "high error — consider tuning",
        }
    }
}

/// Qualitative reading of the headline metrics.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub accuracy: AccuracyBand,
    pub error: ErrorBand,
}

impl Interpretation {
    pub fn from_metrics(metrics: &MetricSummary) -> Self {
        Self {
            accuracy: AccuracyBand::classify(metrics.classification.accuracy),
            error: ErrorBand::classify(metrics.error.mse),
        }
    }
}

/// Boundary points and the shape fitted through them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryReport {
    pub probe_feature: String,
    pub free_feature: String,
    pub points: Vec<BoundaryPoint>,
    pub skipped_probes: usize,
    pub shape: BoundaryShape,
}

impl BoundaryReport {
    pub fn new(
        probe_feature: impl Into<String>,
        free_feature: impl Into<String>,
        set: BoundarySet,
        shape: BoundaryShape,
    ) -> Self {
        Self {
            probe_feature: probe_feature.into(),
            free_feature: free_feature.into(),
            points: set.points,
            skipped_probes: set.skipped,
            shape,
        }
    }
}

/// Result of one evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub metrics: MetricSummary,
    pub interpretation: Interpretation,
    pub boundary: Option<BoundaryReport>,
}

impl EvaluationReport {
    pub fn new(samples: usize, metrics: MetricSummary, boundary: Option<BoundaryReport>) -> Self {
        Self {
            samples,
            interpretation: Interpretation::from_metrics(&metrics),
            metrics,
            boundary,
        }
    }

    pub fn to_json(&self) -> EvalResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| EvalError::invalid(format!("report is not serialisable: {err}")))
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{v:.4}"))
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = &self.metrics.classification;
        let counts = &class.counts;

        writeln!(f, "Evaluated samples: {}", self.samples)?;
        writeln!(
            f,
            "Confusion matrix: TP={} FP={} FN={} TN={}",
            counts.true_positive, counts.false_positive, counts.false_negative, counts.true_negative
        )?;
        writeln!(
            f,
            "Accuracy: {:.4} ({})",
            class.accuracy,
            self.interpretation.accuracy.as_str()
        )?;
        writeln!(f, "Precision: {}", optional(class.precision))?;
        writeln!(f, "Recall: {}", optional(class.recall))?;
        writeln!(f, "F1: {:.4}", class.f1)?;
        writeln!(f, "AUC: {}", optional(class.auc))?;
        writeln!(
            f,
            "MSE: {:.4} (RMSE {:.4}, {})",
            self.metrics.error.mse,
            self.metrics.error.rmse,
            self.interpretation.error.as_str()
        )?;

        let Some(boundary) = &self.boundary else {
            return Ok(());
        };
        writeln!(
            f,
            "Decision boundary ({} vs {}): {} points, {} probes without a crossing",
            boundary.free_feature,
            boundary.probe_feature,
            boundary.points.len(),
            boundary.skipped_probes
        )?;
        match &boundary.shape {
            BoundaryShape::Linear { fit, formula } => {
                writeln!(f, "Boundary is linear: {formula} (R² {:.4})", fit.r_squared)
            }
            BoundaryShape::NonLinear { fit } => {
                writeln!(f, "Boundary is non-linear (R² {:.4})", fit.r_squared)
            }
            BoundaryShape::Indeterminate { .. } => writeln!(f, "Boundary indeterminate"),
        }
    }
}
