//! hl-core: stable foundation for heatloop.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - timing (wall-clock timer for run reporting)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::CoreError;
pub use numeric::*;
