//! Planting schedule: CSV rows in, calendar events out.
//!
//! [`reader`] loads the spreadsheet, [`transform`] anchors every row on the
//! last frost date and [`publisher`] turns the result into Calendar inserts.

pub mod error;
pub mod publisher;
pub mod reader;
pub mod transform;

pub use error::ScheduleError;
pub use publisher::{EventPublisher, PublishSettings, PublishSummary};
pub use reader::{read_schedule, read_schedule_file, ScheduleRow, REQUIRED_COLUMNS};
pub use transform::{derive_events, to_rfc3339, DerivedEvent, FrostDates, TransplantEvent};
