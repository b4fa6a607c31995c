//! Schedule loading and date derivation errors.

use chrono::NaiveDateTime;
use garden_core::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Failed to open schedule {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schedule is missing required column \"{0}\"")]
    MissingColumn(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("{0} does not exist in {1}")]
    InvalidLocalTime(NaiveDateTime, String),

    #[error("Offset of {0} weeks is out of range")]
    OffsetOutOfRange(i64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
