//! hl-results: run cache, timeseries storage, CSV export and loop metrics.

pub mod export;
pub mod hash;
pub mod metrics;
pub mod store;
pub mod types;

pub use export::{export_csv, export_csv_string};
pub use hash::compute_run_id;
pub use metrics::{LoopMetrics, compute_loop_metrics};
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] hl_sim::SimError),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },
}
