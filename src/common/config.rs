//! Runtime configuration loaded from the environment or a JSON blob.
//!
//! Unparseable environment values fall back to the documented defaults; range
//! checks happen in [`SearchParams::validate`] right before a search runs.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::{EvalError, EvalResult};

pub const DEFAULT_PROBE_COUNT: usize = 40;
pub const DEFAULT_TOLERANCE: f64 = 0.05;
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
/// Share of the free feature's range below which bisection stops when no
/// absolute threshold is configured. 0.002 of a 0..50000 income range is 100.
pub const DEFAULT_CONVERGENCE_FRACTION: f64 = 0.002;

/// Numeric knobs for the boundary search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub probe_count: usize,
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Absolute stop width in the free feature's units; `None` scales with its range.
    pub convergence_threshold: Option<f64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            probe_count: DEFAULT_PROBE_COUNT,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: None,
        }
    }
}

impl SearchParams {
    /// Parse parameters from JSON; missing keys take their defaults.
    pub fn from_json(raw: &str) -> EvalResult<Self> {
        let params: Self =
            serde_json::from_str(raw).map_err(|err| EvalError::config(err.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Reject values that would make the search meaningless.
    pub fn validate(&self) -> EvalResult<()> {
        if self.max_iterations == 0 {
            return Err(EvalError::config("max_iterations must be at least 1"));
        }
        if !(self.tolerance > 0.0 && self.tolerance <= 0.5) {
            return Err(EvalError::config("tolerance must be in (0, 0.5]"));
        }
        if let Some(threshold) = self.convergence_threshold {
            if !(threshold >= 0.0 && threshold.is_finite()) {
                return Err(EvalError::config(
                    "convergence_threshold must be a finite non-negative number",
                ));
            }
        }
        Ok(())
    }

    /// Interval width below which bisection over `[low, high]` stops.
    pub fn stop_width(&self, low: f64, high: f64) -> f64 {
        self.convergence_threshold
            .unwrap_or((high - low) * DEFAULT_CONVERGENCE_FRACTION)
    }
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct EvalCfg {
    pub log_level: String,
    pub search: SearchParams,
}

impl EvalCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed_or<T: FromStr>(raw: Option<String>, default: T) -> T {
            raw.and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        }

        let defaults = SearchParams::default();
        Self {
            log_level: lookup("DECISION_PROBE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            search: SearchParams {
                probe_count: parsed_or(
                    lookup("DECISION_PROBE_PROBE_COUNT"),
                    defaults.probe_count,
                ),
                tolerance: parsed_or(lookup("DECISION_PROBE_TOLERANCE"), defaults.tolerance),
                max_iterations: parsed_or(
                    lookup("DECISION_PROBE_MAX_ITERATIONS"),
                    defaults.max_iterations,
                ),
                convergence_threshold: lookup("DECISION_PROBE_CONVERGENCE")
                    .and_then(|value| value.trim().parse().ok())
                    .or(defaults.convergence_threshold),
            },
        }
    }
}

impl Default for EvalCfg {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            search: SearchParams::default(),
        }
    }
}
