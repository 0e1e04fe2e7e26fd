//! Core sample definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Representative applicant age used to hold the `age` feature fixed while probing.
pub const DEFAULT_AGE: f64 = 35.0;
/// Representative loan term, in months.
pub const DEFAULT_TERM_MONTHS: f64 = 24.0;

/// A single feature value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(value) => Some(*value),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Categorical(value) => Some(value),
            FeatureValue::Numeric(_) => None,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Numeric(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Categorical(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Categorical(value)
    }
}

/// Named feature values, ordered by name so iteration is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<String, FeatureValue>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.0.get(name)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FeatureValue::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A labelled evaluation sample. Never mutated by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: FeatureSet,
    pub label: bool,
}

impl Sample {
    pub fn new(features: FeatureSet, label: bool) -> Self {
        Self { features, label }
    }
}

/// Values used to hold non-searched features fixed while probing the boundary.
///
/// Explicit overrides win; features without one fall back to the sample median
/// (numeric) or most common value (categorical).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefaults {
    pub overrides: FeatureSet,
}

impl FeatureDefaults {
    /// No overrides: every feature falls back to the sample statistics.
    pub fn from_samples() -> Self {
        Self::default()
    }

    /// Defaults for loan-application models: a 35 year old on a 24 month term.
    pub fn loan_profile() -> Self {
        Self {
            overrides: FeatureSet::new()
                .with("age", DEFAULT_AGE)
                .with("term", DEFAULT_TERM_MONTHS),
        }
    }

    pub fn with_override(
        mut self,
        name: impl Into<String>,
        value: impl Into<FeatureValue>,
    ) -> Self {
        self.overrides.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_values_round_trip_through_json() {
        let features = FeatureSet::new().with("income", 52_000.0).with("job", "skilled");
        let json = serde_json::to_string(&features).expect("serialise");
        assert_eq!(json, r#"{"income":52000.0,"job":"skilled"}"#);

        let back: FeatureSet = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back.numeric("income"), Some(52_000.0));
        assert_eq!(back.get("job").and_then(FeatureValue::as_category), Some("skilled"));
    }

    #[test]
    fn loan_profile_names_its_constants() {
        let defaults = FeatureDefaults::loan_profile();
        assert_eq!(defaults.overrides.numeric("age"), Some(DEFAULT_AGE));
        assert_eq!(defaults.overrides.numeric("term"), Some(DEFAULT_TERM_MONTHS));
        assert!(defaults.overrides.get("job").is_none());

        let pinned = defaults.with_override("job", "management");
        assert_eq!(
            pinned.overrides.get("job").and_then(FeatureValue::as_category),
            Some("management")
        );
    }
}
