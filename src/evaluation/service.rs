//! Evaluation entry point tying metrics and boundary estimation together.

use std::time::Instant;

use tracing::{info, warn};

use crate::common::error::EvalResult;
use crate::data::domain::Sample;
use crate::data::service::ensure_non_empty;
use crate::inference::domain::PredictionOracle;
use crate::inference::service::batch_predict;

use super::boundary::locate_boundary;
use super::domain::{BoundarySearch, Observation};
use super::fit::describe_shape;
use super::metrics::aggregate;
use super::report::{BoundaryReport, EvaluationReport};

/// Evaluate `oracle` against labelled `samples`, optionally probing its
/// decision boundary.
///
/// An empty or malformed sample set fails the whole call. Too few boundary
/// points do not: the report carries an indeterminate boundary instead.
pub fn evaluate<O>(
    oracle: &O,
    samples: &[Sample],
    search: Option<&BoundarySearch>,
) -> EvalResult<EvaluationReport>
where
    O: PredictionOracle + ?Sized,
{
    let start = Instant::now();
    ensure_non_empty(samples)?;
    info!(samples = samples.len(), "evaluation started");

    let observations: Vec<Observation> = batch_predict(oracle, samples)
        .into_iter()
        .zip(samples)
        .map(|(prediction, sample)| {
            Observation::new(prediction.probability, prediction.label, sample.label)
        })
        .collect();
    let metrics = aggregate(&observations)?;

    let boundary = match search {
        Some(search) => {
            let set = locate_boundary(oracle, samples, search)?;
            let shape = describe_shape(&set.points, &search.probe_feature, &search.free_feature);
            if set.len() < 2 {
                warn!(
                    found = set.len(),
                    skipped = set.skipped,
                    "too few boundary points, boundary indeterminate"
                );
            }
            Some(BoundaryReport::new(
                search.probe_feature.clone(),
                search.free_feature.clone(),
                set,
                shape,
            ))
        }
        None => None,
    };

    let report = EvaluationReport::new(samples.len(), metrics, boundary);
    info!(
        accuracy = report.metrics.classification.accuracy,
        mse = report.metrics.error.mse,
        dur_ms = start.elapsed().as_millis() as u64,
        "evaluation finished"
    );
    Ok(report)
}
