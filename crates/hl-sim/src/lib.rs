//! Closed-loop temperature simulation for heatloop.
//!
//! Provides:
//! - Run configuration with validation
//! - First-order thermal plant (linear heating, Newtonian cooling)
//! - Fixed-step driver that couples a PID controller to the plant and records the run

pub mod config;
pub mod error;
pub mod plant;
pub mod sim;

// Re-exports for public API
pub use config::{MAX_STEPS, SimConfig};
pub use error::{SimError, SimResult};
pub use plant::{PlantParams, ThermalPlant};
pub use sim::{SimProgress, SimRecord, SimSample, run_sim, run_sim_with_progress};
