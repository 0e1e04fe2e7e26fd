//! Summary statistics over a labelled sample set.
//!
//! These feed the boundary search: observed ranges bound the bisection and
//! medians / modes stand in for features that are held fixed.

use std::collections::{BTreeMap, BTreeSet};

use crate::common::error::{EvalError, EvalResult};

use super::domain::{FeatureDefaults, FeatureSet, FeatureValue, Sample};

/// Reject an empty sample set.
pub fn ensure_non_empty(samples: &[Sample]) -> EvalResult<()> {
    if samples.is_empty() {
        return Err(EvalError::invalid("evaluation sample set is empty"));
    }
    Ok(())
}

/// Observed `[min, max]` of a numeric feature. Every sample must carry it.
pub fn numeric_range(samples: &[Sample], feature: &str) -> EvalResult<(f64, f64)> {
    ensure_non_empty(samples)?;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for (idx, sample) in samples.iter().enumerate() {
        let value = sample.features.numeric(feature).ok_or_else(|| {
            EvalError::invalid(format!(
                "sample {idx} has no numeric value for feature `{feature}`"
            ))
        })?;
        if !value.is_finite() {
            return Err(EvalError::invalid(format!(
                "sample {idx} has a non-finite value for feature `{feature}`"
            )));
        }
        min = min.min(value);
        max = max.max(value);
    }

    Ok((min, max))
}

/// Median of the values; `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties resolve to the lexicographically smallest.
pub fn most_common<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// `count` equally spaced values covering `[min, max]` inclusive.
pub fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { max } else { min + step * i as f64 })
                .collect()
        }
    }
}

/// Fixed values for every feature in the sample set except `excluded`.
pub fn resolve_defaults(
    samples: &[Sample],
    defaults: &FeatureDefaults,
    excluded: &[&str],
) -> EvalResult<FeatureSet> {
    ensure_non_empty(samples)?;

    let names: BTreeSet<&str> = samples
        .iter()
        .flat_map(|sample| sample.features.iter().map(|(name, _)| name))
        .chain(defaults.overrides.iter().map(|(name, _)| name))
        .filter(|name| !excluded.contains(name))
        .collect();

    let mut resolved = FeatureSet::new();
    for name in names {
        if let Some(value) = defaults.overrides.get(name) {
            resolved.insert(name, value.clone());
            continue;
        }
        if let Some(value) = representative_value(samples, name) {
            resolved.insert(name, value);
        }
    }
    Ok(resolved)
}

fn representative_value(samples: &[Sample], feature: &str) -> Option<FeatureValue> {
    let values: Vec<&FeatureValue> = samples
        .iter()
        .filter_map(|sample| sample.features.get(feature))
        .collect();

    let numeric: Vec<f64> = values.iter().filter_map(|value| value.as_f64()).collect();
    if numeric.len() == values.len() {
        return median(&numeric).map(FeatureValue::Numeric);
    }

    most_common(values.iter().filter_map(|value| value.as_category()))
        .map(FeatureValue::Categorical)
}
