// lib.rs - black-box classifier evaluation and decision boundary probing
pub mod common;
pub mod data;
pub mod evaluation;
pub mod inference;

pub use common::{EvalCfg, EvalError, EvalResult, SearchParams};
pub use data::{FeatureDefaults, FeatureSet, FeatureValue, Sample};
pub use evaluation::{evaluate, BoundarySearch, BoundaryShape, EvaluationReport};
pub use inference::{LogisticOracle, MemoizedOracle, Prediction, PredictionOracle};
