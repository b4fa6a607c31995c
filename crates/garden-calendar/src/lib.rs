//! Google Calendar integration for the garden scheduler.
//!
//! Provides the Calendar v3 client, request/response types and calendar lookup by name.

pub mod client;
pub mod error;
pub mod resolver;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use resolver::find_calendar;
pub use types::{
    AccessRole, Attendee, Calendar, CreatedEvent, EventDateTime, NewEvent, ReminderMethod,
    ReminderOverride, Reminders,
};
