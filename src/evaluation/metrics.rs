//! Metric aggregation over evaluated samples.
//!
//! Two passes at most: one to count and accumulate squared error, one to rank
//! probabilities for AUC.

use tracing::debug;

use crate::common::error::{EvalError, EvalResult};

use super::domain::{
    ClassificationMetrics, ConfusionCounts, ErrorMetrics, MetricSummary, Observation,
};

/// Compute every metric for a non-empty set of observations.
pub fn aggregate(observations: &[Observation]) -> EvalResult<MetricSummary> {
    if observations.is_empty() {
        return Err(EvalError::invalid("no observations to aggregate"));
    }

    let mut counts = ConfusionCounts::default();
    let mut squared_error = 0.0;
    for (idx, obs) in observations.iter().enumerate() {
        if !(0.0..=1.0).contains(&obs.probability) {
            return Err(EvalError::invalid(format!(
                "observation {idx} has probability {} outside [0, 1]",
                obs.probability
            )));
        }
        counts.record(obs.predicted, obs.actual);
        let target = if obs.actual { 1.0 } else { 0.0 };
        squared_error += (target - obs.probability).powi(2);
    }

    let mse = squared_error / observations.len() as f64;
    let classification = ClassificationMetrics {
        counts,
        accuracy: counts.accuracy().unwrap_or(0.0),
        precision: counts.precision(),
        recall: counts.recall(),
        f1: counts.f1(),
        auc: roc_auc(observations),
    };

    debug!(
        tp = counts.true_positive,
        fp = counts.false_positive,
        fn_ = counts.false_negative,
        tn = counts.true_negative,
        mse,
        "metrics aggregated"
    );

    Ok(MetricSummary {
        classification,
        error: ErrorMetrics {
            mse,
            rmse: mse.sqrt(),
        },
    })
}

/// Area under the ROC curve via the Mann-Whitney rank statistic.
///
/// Tied probabilities share their average rank, which splits the credit of a
/// tied positive/negative pair evenly. `None` if either class is absent.
pub fn roc_auc(observations: &[Observation]) -> Option<f64> {
    let positives = observations.iter().filter(|obs| obs.actual).count();
    let negatives = observations.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut ranked: Vec<(f64, bool)> = observations
        .iter()
        .map(|obs| (obs.probability, obs.actual))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && ranked[end].0 == ranked[start].0 {
            end += 1;
        }
        // 1-based ranks start+1 ..= end share their mean.
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = ranked[start..end].iter().filter(|(_, actual)| *actual).count();
        positive_rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let n_pos = positives as f64;
    let n_neg = negatives as f64;
    Some((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn obs(probability: f64, actual: bool) -> Observation {
        Observation::new(probability, probability >= 0.5, actual)
    }

    #[test]
    fn three_sample_example() {
        let summary = aggregate(&[obs(0.9, true), obs(0.1, false), obs(0.4, true)]).unwrap();
        let c = summary.classification.counts;
        assert_eq!(
            (c.true_positive, c.false_positive, c.false_negative, c.true_negative),
            (1, 0, 1, 1)
        );
        assert_abs_diff_eq!(summary.classification.accuracy, 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(summary.classification.precision, Some(1.0));
        assert_eq!(summary.classification.recall, Some(0.5));
        assert_abs_diff_eq!(summary.classification.f1, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.error.mse, 0.38 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.error.rmse, (0.38f64 / 3.0).sqrt(), epsilon = 1e-12);
        // 0.9 beats 0.1, 0.4 beats 0.1.
        assert_eq!(summary.classification.auc, Some(1.0));
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(matches!(aggregate(&[]), Err(EvalError::InvalidInput(_))));
    }

    #[test]
    fn probability_outside_unit_interval_is_invalid() {
        assert!(aggregate(&[obs(1.2, true)]).is_err());
        assert!(aggregate(&[obs(f64::NAN, true)]).is_err());
    }

    #[test]
    fn perfect_probabilities_have_zero_error() {
        let summary = aggregate(&[obs(1.0, true), obs(0.0, false), obs(1.0, true)]).unwrap();
        assert_eq!(summary.error.mse, 0.0);
        assert_eq!(summary.error.rmse, 0.0);
        assert_eq!(summary.classification.accuracy, 1.0);
    }

    #[test]
    fn mse_ignores_order() {
        let forward = [obs(0.2, true), obs(0.7, false), obs(0.55, true), obs(0.05, false)];
        let mut reversed = forward;
        reversed.reverse();
        assert_abs_diff_eq!(
            aggregate(&forward).unwrap().error.mse,
            aggregate(&reversed).unwrap().error.mse,
            epsilon = 1e-15
        );
    }

    #[test]
    fn auc_of_perfect_and_inverted_rankings() {
        let perfect = [obs(0.9, true), obs(0.8, true), obs(0.3, false), obs(0.1, false)];
        assert_eq!(roc_auc(&perfect), Some(1.0));

        let inverted = [obs(0.1, true), obs(0.2, true), obs(0.8, false), obs(0.9, false)];
        assert_eq!(roc_auc(&inverted), Some(0.0));
    }

    #[test]
    fn auc_splits_ties() {
        let tied = [obs(0.5, true), obs(0.5, false)];
        assert_eq!(roc_auc(&tied), Some(0.5));

        // positive 0.7 beats both negatives; positive 0.4 ties one and beats one.
        let mixed = [obs(0.7, true), obs(0.4, true), obs(0.4, false), obs(0.2, false)];
        assert_abs_diff_eq!(roc_auc(&mixed).unwrap(), 3.5 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn auc_undefined_for_single_class() {
        assert_eq!(roc_auc(&[obs(0.9, true), obs(0.2, true)]), None);
        let summary = aggregate(&[obs(0.3, false)]).unwrap();
        assert_eq!(summary.classification.auc, None);
        assert_eq!(summary.classification.precision, None);
        assert_eq!(summary.classification.recall, None);
        assert_eq!(summary.classification.f1, 0.0);
    }
}
