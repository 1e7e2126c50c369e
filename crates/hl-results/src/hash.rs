//! Content-based hashing for run IDs.
//!
//! A run is fully determined by its configuration, so the id doubles as a cache key.

use hl_sim::SimConfig;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Bumped whenever a change to the loop would alter results for the same config.
pub const SIM_VERSION: &str = "1";

/// Only valid configurations get an id.
pub fn compute_run_id(config: &SimConfig) -> ResultsResult<String> {
    config.validate()?;

    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config)?;
    hasher.update(config_json.as_bytes());
    hasher.update(SIM_VERSION.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
