//! Feedback controllers for heatloop.
//!
//! The controller here is a plain stateful value: it knows nothing about the
//! plant it drives and nothing about wall-clock time. The caller supplies the
//! elapsed time slice on every update.
//!
//! # Design Principles
//!
//! - **Explicit state**: error history and integral live in [`PidState`], owned by the controller
//! - **Fail fast**: a non-positive time slice is an error and never touches the state
//! - **Bounded**: outputs are clamped to the configured limits, the integral to its own band

pub mod controller;
pub mod error;

pub use controller::{
    DEFAULT_INTEGRAL_LIMIT, DEFAULT_OUTPUT_MAX, DEFAULT_OUTPUT_MIN, PidController, PidGains,
    PidState, PidTerms,
};
pub use error::{ControlError, ControlResult};
