//! Evaluation: classification metrics, decision boundary estimation and reporting.

pub mod boundary;
pub mod domain;
pub mod fit;
pub mod metrics;
pub mod report;
pub mod service;

pub use domain::{
    BoundaryPoint, BoundarySearch, BoundaryShape, BoundarySet, ClassificationMetrics,
    ConfusionCounts, ErrorMetrics, FitResult, MetricSummary, Observation, ProbeOutcome,
};
pub use report::{AccuracyBand, BoundaryReport, ErrorBand, EvaluationReport, Interpretation};
pub use service::evaluate;
