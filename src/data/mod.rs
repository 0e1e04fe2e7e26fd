//! Data domain: labelled samples and the statistics derived from them.
//!
//! Loading samples from disk is left to the host; the core only consumes them.

pub mod domain;
pub mod service;

pub use domain::{FeatureDefaults, FeatureSet, FeatureValue, Sample};
