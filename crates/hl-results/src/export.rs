//! CSV export of a run, the hand-off format for external chart rendering.

use std::io::Write;

use crate::ResultsResult;
use crate::types::TimeseriesRecord;

pub const CSV_HEADER: &str = "time_s,temperature,power_pct,target";

pub fn export_csv<W: Write>(records: &[TimeseriesRecord], mut out: W) -> ResultsResult<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{}",
            r.time_s, r.temperature, r.power_pct, r.target
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_csv_string(records: &[TimeseriesRecord]) -> ResultsResult<String> {
    let mut buf = Vec::new();
    export_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
