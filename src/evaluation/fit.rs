//! Straight-line fit through boundary points.

use tracing::debug;

use crate::common::error::{EvalError, EvalResult};

use super::domain::{BoundaryPoint, BoundaryShape, FitResult};

/// Points needed before a line means anything.
pub const MIN_FIT_POINTS: usize = 2;
/// R² above which a boundary is reported as linear.
pub const LINEAR_R_SQUARED: f64 = 0.7;

/// Ordinary least squares of `boundary_value` on `probe_value`.
///
/// Fewer than two points give `InsufficientData`; points that all share one
/// probe value give `NoProbeSpread`. Boundary values with zero spread fit a
/// horizontal line with R² = 1.
pub fn fit_line(points: &[BoundaryPoint]) -> EvalResult<FitResult> {
    if points.len() < MIN_FIT_POINTS {
        return Err(EvalError::InsufficientData {
            found: points.len(),
            required: MIN_FIT_POINTS,
        });
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for point in points {
        let (x, y) = (point.probe_value, point.boundary_value);
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    let mean_x = sum_x / n;
    let spread_x: f64 = points
        .iter()
        .map(|p| (p.probe_value - mean_x).powi(2))
        .sum();
    if spread_x == 0.0 || denominator == 0.0 {
        return Err(EvalError::NoProbeSpread {
            points: points.len(),
        });
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = points
        .iter()
        .map(|p| (p.boundary_value - mean_y).powi(2))
        .sum();
    let ss_res: f64 = points
        .iter()
        .map(|p| (p.boundary_value - (slope * p.probe_value + intercept)).powi(2))
        .sum();

    // Identical boundary values can leave rounding dust in ss_tot.
    let r_squared = if ss_tot <= f64::EPSILON * n * mean_y.abs().max(1.0).powi(2) {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    let fit = FitResult {
        slope,
        intercept,
        r_squared,
    };
    debug!(slope, intercept, r_squared, points = points.len(), "boundary fitted");
    Ok(fit)
}

/// Fit the points and classify the result. Never fails: too few points is
/// itself a description.
pub fn describe_shape(
    points: &[BoundaryPoint],
    probe_feature: &str,
    free_feature: &str,
) -> BoundaryShape {
    match fit_line(points) {
        Ok(fit) if fit.r_squared > LINEAR_R_SQUARED => BoundaryShape::Linear {
            formula: formula(&fit, probe_feature, free_feature),
            fit,
        },
        Ok(fit) => BoundaryShape::NonLinear { fit },
        Err(_) => BoundaryShape::Indeterminate {
            points: points.len(),
        },
    }
}

/// `free = slope × probe ± intercept`, rounded for display.
pub fn formula(fit: &FitResult, probe_feature: &str, free_feature: &str) -> String {
    let slope = zero_if_rounds_away(fit.slope, 4);
    let intercept = zero_if_rounds_away(fit.intercept, 2);
    let sign = if intercept < 0.0 { '-' } else { '+' };
    format!(
        "{free_feature} = {slope:.4} × {probe_feature} {sign} {:.2}",
        intercept.abs()
    )
}

// Keeps values like -1e-17 from printing as "-0.0000".
fn zero_if_rounds_away(value: f64, decimals: i32) -> f64 {
    if (value * 10f64.powi(decimals)).round() == 0.0 {
        0.0
    } else {
        value
    }
}
