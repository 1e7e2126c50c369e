//! Result data types.

use hl_sim::{SimConfig, SimRecord};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub timestamp: String,
    pub config: SimConfig,
    pub steps: usize,
    pub final_temperature: Option<f64>,
}

impl RunManifest {
    /// Manifest for a finished run, stamped with the current UTC time.
    pub fn new(run_id: RunId, config: SimConfig, record: &SimRecord) -> Self {
        Self {
            run_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            config,
            steps: record.len(),
            final_temperature: record.final_temperature(),
        }
    }
}

/// One persisted tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    pub temperature: f64,
    pub power_pct: f64,
    pub target: f64,
}

pub fn records_from_sim(record: &SimRecord) -> Vec<TimeseriesRecord> {
    record
        .iter()
        .map(|s| TimeseriesRecord {
            time_s: s.time_s,
            temperature: s.temperature,
            power_pct: s.power,
            target: s.target,
        })
        .collect()
}

/// Rebuild the parallel series from persisted ticks.
pub fn sim_from_records(records: &[TimeseriesRecord]) -> SimRecord {
    SimRecord {
        times: records.iter().map(|r| r.time_s).collect(),
        temperatures: records.iter().map(|r| r.temperature).collect(),
        powers: records.iter().map(|r| r.power_pct).collect(),
        targets: records.iter().map(|r| r.target).collect(),
    }
}
