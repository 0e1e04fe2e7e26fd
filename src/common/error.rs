//! Error handling primitives shared across the core.
//!
//! Non-convergence of a single probe value is deliberately absent here: it is a
//! normal outcome recorded by the boundary locator, not a failure.

/// Stable error codes for callers that need a machine parsable value.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Input failed validation.
    InvalidInput = 4,
    /// Too few boundary points to describe a boundary.
    InsufficientData = 6,
    /// Configuration could not be parsed or is out of range.
    Config = 7,
}

/// Canonical error type for the core.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: found {found} boundary points, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    #[error("Insufficient data: all {points} boundary points share one probe value")]
    NoProbeSpread { points: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Validation helper.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Configuration helper.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Machine parsable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::InvalidInput(_) => ErrorCode::InvalidInput,
            EvalError::InsufficientData { .. } | EvalError::NoProbeSpread { .. } => {
                ErrorCode::InsufficientData
            }
            EvalError::Config(_) => ErrorCode::Config,
        }
    }

    /// Whether the caller can still build a partial report after this error.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            EvalError::InsufficientData { .. } | EvalError::NoProbeSpread { .. }
        )
    }
}
