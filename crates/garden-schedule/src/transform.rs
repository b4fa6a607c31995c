//! Frost-anchored planting dates.
//!
//! Week offsets are applied to the local wall clock of the frost timezone, so
//! an 08:00 anchor produces 08:00 events on either side of a DST change. The
//! event end is an absolute offset from its start.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone};
use chrono_tz::Tz;
use garden_core::FrostConfig;

use crate::error::ScheduleError;
use crate::reader::ScheduleRow;

/// Length of every planting event.
pub const EVENT_DURATION_HOURS: i64 = 3;

/// Frost dates localized to the garden's timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrostDates {
    pub last_frost: DateTime<Tz>,
    pub first_frost: DateTime<Tz>,
}

impl FrostDates {
    pub fn new(
        tz: Tz,
        last_frost: NaiveDateTime,
        first_frost: NaiveDateTime,
    ) -> Result<Self, ScheduleError> {
        Ok(Self {
            last_frost: localize(tz, last_frost)?,
            first_frost: localize(tz, first_frost)?,
        })
    }

    pub fn from_config(config: &FrostConfig) -> Result<Self, ScheduleError> {
        Self::new(config.tz()?, config.last_frost, config.first_frost)
    }

    pub fn timezone(&self) -> Tz {
        self.last_frost.timezone()
    }

    /// Length of the frost-free season.
    pub fn growing_season(&self) -> TimeDelta {
        self.first_frost - self.last_frost
    }

    /// The last frost moved back `weeks` weeks on the local calendar.
    pub fn weeks_before_last_frost(&self, weeks: i64) -> Result<DateTime<Tz>, ScheduleError> {
        let offset = TimeDelta::try_weeks(weeks).ok_or(ScheduleError::OffsetOutOfRange(weeks))?;
        let local = self
            .last_frost
            .naive_local()
            .checked_sub_signed(offset)
            .ok_or(ScheduleError::OffsetOutOfRange(weeks))?;
        localize(self.timezone(), local)
    }
}

/// Repeated wall-clock times (DST fall-back) resolve to the earlier instant.
/// Skipped ones (spring-forward gap) are an error.
fn localize(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, ScheduleError> {
    tz.from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| ScheduleError::InvalidLocalTime(local, tz.name().to_string()))
}

/// RFC 3339 with offset and whole seconds, e.g. `2023-02-27T08:00:00-06:00`.
pub fn to_rfc3339(dt: &DateTime<Tz>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransplantEvent {
    pub name: String,
    pub at: DateTime<Tz>,
}

impl TransplantEvent {
    pub fn end(&self) -> DateTime<Tz> {
        self.at + TimeDelta::hours(EVENT_DURATION_HOURS)
    }
}

/// Everything computed for one schedule row.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedEvent {
    pub event_name: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub transplant: Option<TransplantEvent>,
}

impl DerivedEvent {
    pub fn from_row(row: &ScheduleRow, frost: &FrostDates) -> Result<Self, ScheduleError> {
        let start = frost.weeks_before_last_frost(row.seed_start_weeks)?;

        let transplant = row
            .transplant_start_weeks
            .map(|weeks| -> Result<_, ScheduleError> {
                Ok(TransplantEvent {
                    name: title("Transplant", row),
                    at: frost.weeks_before_last_frost(weeks)?,
                })
            })
            .transpose()?;

        Ok(Self {
            event_name: title("Plant", row),
            start,
            end: start + TimeDelta::hours(EVENT_DURATION_HOURS),
            transplant,
        })
    }
}

fn title(action: &str, row: &ScheduleRow) -> String {
    format!(
        "{} {} ({} {})",
        action, row.vegetable, row.season, row.seed_start
    )
}

/// Derive events for every row, in row order.
pub fn derive_events(
    rows: &[ScheduleRow],
    frost: &FrostDates,
) -> Result<Vec<DerivedEvent>, ScheduleError> {
    rows.iter()
        .map(|row| DerivedEvent::from_row(row, frost))
        .collect()
}
