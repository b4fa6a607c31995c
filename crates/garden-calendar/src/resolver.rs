//! Calendar lookup by display name.

use crate::types::Calendar;

/// Find the calendar whose display name is exactly `name`.
///
/// The first match in list order wins when several calendars share a name.
pub fn find_calendar<'a>(calendars: &'a [Calendar], name: &str) -> Option<&'a Calendar> {
    calendars.iter().find(|c| c.summary == name)
}
