//! The prediction capability the evaluator consumes.
//!
//! The core never sees model internals. Anything that can map a [`FeatureSet`]
//! to a probability is an oracle, and it must answer identically for identical
//! input or the boundary bisection cannot converge.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::data::domain::{FeatureSet, FeatureValue};

/// Probability at or above which an oracle reports the positive label.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Result of a single oracle call.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: bool,
    pub probability: f64,
}

impl Prediction {
    /// Label derived by thresholding at [`DECISION_THRESHOLD`].
    pub fn from_probability(probability: f64) -> Self {
        Self {
            label: probability >= DECISION_THRESHOLD,
            probability,
        }
    }
}

/// Black-box classifier.
pub trait PredictionOracle {
    fn predict(&self, features: &FeatureSet) -> Prediction;
}

impl<F> PredictionOracle for F
where
    F: Fn(&FeatureSet) -> Prediction,
{
    fn predict(&self, features: &FeatureSet) -> Prediction {
        self(features)
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Linear-logit model: `sigmoid(Σ wᵢ·xᵢ + bias)` over named numeric features.
///
/// Features that are absent or categorical contribute nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticOracle {
    pub weights: Vec<(String, f64)>,
    pub bias: f64,
}

impl LogisticOracle {
    pub fn new(bias: f64) -> Self {
        Self {
            weights: Vec::new(),
            bias,
        }
    }

    pub fn with_weight(mut self, feature: impl Into<String>, weight: f64) -> Self {
        self.weights.push((feature.into(), weight));
        self
    }

    pub fn logit(&self, features: &FeatureSet) -> f64 {
        self.weights
            .iter()
            .map(|(name, weight)| weight * features.numeric(name).unwrap_or(0.0))
            .sum::<f64>()
            + self.bias
    }
}

impl PredictionOracle for LogisticOracle {
    fn predict(&self, features: &FeatureSet) -> Prediction {
        Prediction::from_probability(sigmoid(self.logit(features)))
    }
}

/// Caches predictions for identical feature sets.
///
/// Only valid because oracles are required to be pure. Not `Sync`; the core
/// is single threaded.
pub struct MemoizedOracle<O> {
    inner: O,
    cache: RefCell<HashMap<String, Prediction>>,
    misses: Cell<usize>,
}

impl<O: PredictionOracle> MemoizedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
            misses: Cell::new(0),
        }
    }

    /// Number of calls that reached the wrapped oracle.
    pub fn inner_calls(&self) -> usize {
        self.misses.get()
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: PredictionOracle> PredictionOracle for MemoizedOracle<O> {
    fn predict(&self, features: &FeatureSet) -> Prediction {
        let key = cache_key(features);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return *hit;
        }

        let prediction = self.inner.predict(features);
        self.misses.set(self.misses.get() + 1);
        self.cache.borrow_mut().insert(key, prediction);
        prediction
    }
}

// Bit patterns keep 0.1 + 0.2 and 0.3 apart.
fn cache_key(features: &FeatureSet) -> String {
    let mut key = String::new();
    for (name, value) in features.iter() {
        let _ = match value {
            FeatureValue::Numeric(n) => write!(key, "{name}=n{:016x};", n.to_bits()),
            FeatureValue::Categorical(c) => write!(key, "{name}=c{}:{c};", c.len()),
        };
    }
    key
}
