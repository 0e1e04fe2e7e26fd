//! Running an oracle over a sample set.

use tracing::trace;

use crate::data::domain::Sample;

use super::domain::{Prediction, PredictionOracle};

/// Predict every sample, preserving order.
pub fn batch_predict<O>(oracle: &O, samples: &[Sample]) -> Vec<Prediction>
where
    O: PredictionOracle + ?Sized,
{
    samples
        .iter()
        .map(|sample| {
            let prediction = oracle.predict(&sample.features);
            trace!(
                probability = prediction.probability,
                label = prediction.label,
                actual = sample.label,
                "sample predicted"
            );
            prediction
        })
        .collect()
}
