//! Locating the oracle's 50% confidence surface by bisection.
//!
//! For each probe value the free feature is bisected over its observed range
//! while every other feature is held at a representative default. The oracle is
//! assumed monotone along the free feature; nothing here checks that, and a
//! non-monotone oracle simply yields odd or missing points.

use tracing::{debug, trace};

use crate::common::config::SearchParams;
use crate::common::error::{EvalError, EvalResult};
use crate::data::domain::{FeatureSet, Sample};
use crate::data::service::{linspace, numeric_range, resolve_defaults};
use crate::inference::domain::{PredictionOracle, DECISION_THRESHOLD};

use super::domain::{BoundaryPoint, BoundarySearch, BoundarySet, ProbeOutcome};

/// Bisection state shared by every probe value of one run.
pub struct BoundaryLocator<'a, O: ?Sized> {
    oracle: &'a O,
    base: FeatureSet,
    probe_feature: &'a str,
    free_feature: &'a str,
    free_bounds: (f64, f64),
    params: &'a SearchParams,
}

impl<'a, O> BoundaryLocator<'a, O>
where
    O: PredictionOracle + ?Sized,
{
    /// `base` holds the fixed values; the probe and free features are overwritten per query.
    pub fn new(
        oracle: &'a O,
        base: FeatureSet,
        probe_feature: &'a str,
        free_feature: &'a str,
        free_bounds: (f64, f64),
        params: &'a SearchParams,
    ) -> Self {
        Self {
            oracle,
            base,
            probe_feature,
            free_feature,
            free_bounds,
            params,
        }
    }

    fn probability_at(&self, probe_value: f64, free_value: f64) -> f64 {
        let mut features = self.base.clone();
        features.insert(self.probe_feature, probe_value);
        features.insert(self.free_feature, free_value);
        self.oracle.predict(&features).probability
    }

    /// Bisect the free feature for one probe value.
    ///
    /// A width stop only counts when the oracle was seen on both sides of 0.5;
    /// otherwise the range never contained a crossing.
    pub fn locate(&self, probe_value: f64) -> ProbeOutcome {
        let (mut low, mut high) = self.free_bounds;
        let stop_width = self.params.stop_width(low, high);
        let (mut saw_above, mut saw_below) = (false, false);

        for iteration in 1..=self.params.max_iterations {
            let mid = (low + high) / 2.0;
            let p = self.probability_at(probe_value, mid);
            trace!(probe_value, low, high, mid, p, iteration, "bisection step");

            if (p - DECISION_THRESHOLD).abs() < self.params.tolerance {
                return ProbeOutcome::Crossing {
                    boundary_value: mid,
                    iterations: iteration,
                };
            }

            if p > DECISION_THRESHOLD {
                high = mid;
                saw_above = true;
            } else {
                low = mid;
                saw_below = true;
            }

            if high - low < stop_width {
                if saw_above && saw_below {
                    return ProbeOutcome::Narrowed {
                        boundary_value: mid,
                        iterations: iteration,
                    };
                }
                return ProbeOutcome::NoCrossing;
            }
        }

        ProbeOutcome::NoCrossing
    }

    /// Run every probe value, keeping the ones that converged.
    pub fn run(&self, probe_values: &[f64]) -> BoundarySet {
        let mut set = BoundarySet::default();
        for &probe_value in probe_values {
            let outcome = self.locate(probe_value);
            debug!(probe_value, ?outcome, "probe finished");
            match outcome.boundary_value() {
                Some(boundary_value) => set.points.push(BoundaryPoint {
                    probe_value,
                    boundary_value,
                }),
                None => set.skipped += 1,
            }
        }
        set.points.sort_by(|a, b| a.probe_value.total_cmp(&b.probe_value));
        set
    }
}

/// Find boundary points for `search` using the ranges observed in `samples`.
pub fn locate_boundary<O>(
    oracle: &O,
    samples: &[Sample],
    search: &BoundarySearch,
) -> EvalResult<BoundarySet>
where
    O: PredictionOracle + ?Sized,
{
    if search.probe_feature == search.free_feature {
        return Err(EvalError::invalid(format!(
            "probe and free feature must differ, both are `{}`",
            search.probe_feature
        )));
    }
    search.params.validate()?;

    let (probe_min, probe_max) = numeric_range(samples, &search.probe_feature)?;
    let free_bounds = numeric_range(samples, &search.free_feature)?;
    let base = resolve_defaults(
        samples,
        &search.defaults,
        &[search.probe_feature.as_str(), search.free_feature.as_str()],
    )?;

    let probe_values = linspace(probe_min, probe_max, search.params.probe_count);
    let locator = BoundaryLocator::new(
        oracle,
        base,
        &search.probe_feature,
        &search.free_feature,
        free_bounds,
        &search.params,
    );
    let set = locator.run(&probe_values);

    debug!(
        probe_feature = %search.probe_feature,
        free_feature = %search.free_feature,
        found = set.len(),
        skipped = set.skipped,
        "boundary search finished"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::inference::domain::{LogisticOracle, Prediction};

    fn params(tolerance: f64, max_iterations: u32, convergence_threshold: f64) -> SearchParams {
        SearchParams {
            probe_count: 5,
            tolerance,
            max_iterations,
            convergence_threshold: Some(convergence_threshold),
        }
    }

    fn locator<'a, O: PredictionOracle>(
        oracle: &'a O,
        free_bounds: (f64, f64),
        params: &'a SearchParams,
    ) -> BoundaryLocator<'a, O> {
        BoundaryLocator::new(oracle, FeatureSet::new(), "probe", "free", free_bounds, params)
    }

    #[test]
    fn finds_crossing_of_a_steep_threshold() {
        // p > 0.5 once free >= 300 regardless of probe.
        let oracle = |features: &FeatureSet| {
            let free = features.numeric("free").unwrap_or(0.0);
            Prediction::from_probability(if free >= 300.0 { 0.9 } else { 0.1 })
        };
        let params = params(0.05, 30, 1.0);
        let locator = locator(&oracle, (0.0, 1_000.0), &params);

        match locator.locate(1.0) {
            ProbeOutcome::Narrowed { boundary_value, .. } => {
                assert!((boundary_value - 300.0).abs() < 2.0, "got {boundary_value}");
            }
            other => panic!("expected narrowing, got {other:?}"),
        }
    }

    #[test]
    fn tolerance_hit_stops_immediately() {
        let oracle = |_: &FeatureSet| Prediction::from_probability(0.52);
        let params = params(0.05, 20, 0.0);
        let locator = locator(&oracle, (0.0, 10.0), &params);
        assert_eq!(
            locator.locate(0.0),
            ProbeOutcome::Crossing {
                boundary_value: 5.0,
                iterations: 1
            }
        );
    }

    #[test]
    fn one_sided_oracle_yields_no_point_without_threshold() {
        let oracle = |_: &FeatureSet| Prediction::from_probability(0.95);
        let params = params(0.05, 10, 0.0);
        let locator = locator(&oracle, (0.0, 10.0), &params);

        assert_eq!(locator.locate(3.0), ProbeOutcome::NoCrossing);
        let set = locator.run(&[1.0, 2.0, 3.0]);
        assert!(set.is_empty());
        assert_eq!(set.skipped, 3);
    }

    #[test]
    fn width_stop_without_a_bracket_is_no_crossing() {
        let above = |_: &FeatureSet| Prediction::from_probability(0.97);
        let below = |_: &FeatureSet| Prediction::from_probability(0.02);
        let params = params(0.05, 20, 100.0);

        assert_eq!(
            locator(&above, (0.0, 50_000.0), &params).locate(1_000.0),
            ProbeOutcome::NoCrossing
        );
        assert_eq!(
            locator(&below, (0.0, 50_000.0), &params).locate(1_000.0),
            ProbeOutcome::NoCrossing
        );
    }

    #[test]
    fn default_stop_width_scales_with_a_narrow_free_range() {
        // p = sigmoid(age - 50); the free feature only spans 20..60.
        let oracle = LogisticOracle::new(-50.0).with_weight("age", 1.0);
        let params = SearchParams::default();
        let locator = BoundaryLocator::new(
            &oracle,
            FeatureSet::new(),
            "loan_amount",
            "age",
            (20.0, 60.0),
            &params,
        );

        let set = locator.run(&linspace(1_000.0, 10_000.0, 5));
        assert_eq!(set.len(), 5);
        for point in &set.points {
            assert_abs_diff_eq!(point.boundary_value, 50.0, epsilon = 0.25);
        }
    }

    #[test]
    fn logistic_boundary_follows_the_linear_relation() {
        // logit = 0.001*income - 0.002*loan - 2  => income = 2*loan + 2000 at p = 0.5
        let oracle = LogisticOracle::new(-2.0)
            .with_weight("loan_amount", -0.002)
            .with_weight("income", 0.001);
        let params = params(0.01, 40, 1.0);
        let locator = BoundaryLocator::new(
            &oracle,
            FeatureSet::new(),
            "loan_amount",
            "income",
            (0.0, 50_000.0),
            &params,
        );

        let set = locator.run(&linspace(1_000.0, 10_000.0, 10));
        assert_eq!(set.len(), 10);
        for point in &set.points {
            // |p - 0.5| < 0.01 means |logit| < ~0.04, i.e. income within ~40 of the line.
            assert_abs_diff_eq!(
                point.boundary_value,
                2.0 * point.probe_value + 2_000.0,
                epsilon = 50.0
            );
        }
    }

    #[test]
    fn locate_boundary_validates_features() {
        let samples = vec![Sample::new(
            FeatureSet::new().with("a", 1.0).with("b", 2.0),
            true,
        )];
        let oracle = LogisticOracle::new(0.0);

        let same = BoundarySearch::new("a", "a");
        assert!(matches!(
            locate_boundary(&oracle, &samples, &same),
            Err(EvalError::InvalidInput(_))
        ));

        let missing = BoundarySearch::new("a", "c");
        assert!(matches!(
            locate_boundary(&oracle, &samples, &missing),
            Err(EvalError::InvalidInput(_))
        ));

        let bad_params = BoundarySearch::new("a", "b").with_params(SearchParams {
            max_iterations: 0,
            ..SearchParams::default()
        });
        assert!(matches!(
            locate_boundary(&oracle, &samples, &bad_params),
            Err(EvalError::Config(_))
        ));
    }
}
