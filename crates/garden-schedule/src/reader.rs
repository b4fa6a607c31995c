//! CSV planting schedule.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ScheduleError;

/// Columns every schedule must carry, in their spreadsheet spelling.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Vegetable",
    "Season",
    "Seed Start",
    "Seed Start Weeks",
    "Transplant Start Weeks",
];

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "Vegetable")]
    pub vegetable: String,

    #[serde(rename = "Season")]
    pub season: String,

    /// Seed start method, e.g. "Indoor" or "Direct Sow"
    #[serde(rename = "Seed Start")]
    pub seed_start: String,

    /// Weeks before last frost to start seeds
    #[serde(rename = "Seed Start Weeks")]
    pub seed_start_weeks: i64,

    /// Weeks before last frost to transplant; empty cell means no transplant
    #[serde(rename = "Transplant Start Weeks")]
    pub transplant_start_weeks: Option<i64>,
}

/// Read schedule rows from CSV text.
///
/// Cells are trimmed and extra columns are ignored.
pub fn read_schedule<R: Read>(input: R) -> Result<Vec<ScheduleRow>, ScheduleError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ScheduleError::MissingColumn(column.to_string()));
        }
    }

    let rows = rdr
        .deserialize::<ScheduleRow>()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Read {} schedule rows", rows.len());
    Ok(rows)
}

/// Read schedule rows from a CSV file.
pub fn read_schedule_file(path: &Path) -> Result<Vec<ScheduleRow>, ScheduleError> {
    let file = File::open(path).map_err(|source| ScheduleError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let rows = read_schedule(file)?;
    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
