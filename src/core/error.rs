//! Engine error taxonomy
//!
//! Every failure the numerical engine can produce is a deterministic
//! validation error. None of them are fatal to the process and none are
//! transient, so callers surface the message and fail the single request.

use thiserror::Error;

/// Errors that can occur during reliability computations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Insufficient data: need at least {required} failure times, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Degenerate fit: {reason}")]
    DegenerateFit { reason: String },

    #[error("Domain error: {function}({value}) is undefined")]
    Domain { function: &'static str, value: f64 },

    #[error("Simulation cancelled after {completed_runs} run(s)")]
    Cancelled { completed_runs: usize },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Failed to parse input: {message}")]
    Parse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for a `DegenerateFit` error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        EngineError::DegenerateFit {
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Require a finite, strictly positive value
pub(crate) fn ensure_positive(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid(format!(
            "{} must be a finite positive number, got {}",
            name, value
        )))
    }
}

/// Require a finite, non-negative value
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )))
    }
}
