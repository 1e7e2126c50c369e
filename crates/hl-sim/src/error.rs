//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Controller error: {0}")]
    Control(#[from] hl_controls::ControlError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hl_core::CoreError> for SimError {
    fn from(e: hl_core::CoreError) -> Self {
        match e {
            hl_core::CoreError::NonFinite { what, .. } | hl_core::CoreError::InvalidArg { what } => {
                SimError::InvalidConfig { what }
            }
        }
    }
}
