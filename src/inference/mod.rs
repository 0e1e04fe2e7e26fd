//! Inference domain: the oracle abstraction and batch prediction.

pub mod domain;
pub mod service;

pub use domain::{LogisticOracle, MemoizedOracle, Prediction, PredictionOracle};
