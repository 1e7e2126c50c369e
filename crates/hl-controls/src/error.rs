//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Update called with a time slice that is zero, negative or not finite.
    #[error("Time step must be strictly positive and finite, got dt={dt}")]
    NonPositiveDt { dt: f64 },

    /// Update called with a NaN or infinite setpoint or measurement.
    #[error("Non-finite {what}: {value}")]
    NonFiniteInput { what: &'static str, value: f64 },
}

impl From<hl_core::CoreError> for ControlError {
    fn from(err: hl_core::CoreError) -> Self {
        match err {
            hl_core::CoreError::NonFinite { what, .. } | hl_core::CoreError::InvalidArg { what } => {
                ControlError::InvalidArg { what }
            }
        }
    }
}
