//! Calendar event publishing.

use chrono::DateTime;
use chrono_tz::Tz;
use garden_calendar::{
    Attendee, CalendarClient, CalendarError, EventDateTime, NewEvent, ReminderMethod,
    ReminderOverride, Reminders,
};
use garden_core::Config;

use crate::transform::{to_rfc3339, DerivedEvent};

/// Location text on every planting event.
pub const EVENT_LOCATION: &str = "Garden";

/// Email reminder a day ahead.
pub const EMAIL_REMINDER_MINUTES: u32 = 24 * 60;

/// Popup reminder shortly before.
pub const POPUP_REMINDER_MINUTES: u32 = 10;

/// Per-run publishing parameters.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub calendar_id: String,
    /// Timezone label sent with start and end
    pub time_zone: String,
    pub notification_email: String,
    pub include_transplants: bool,
}

impl PublishSettings {
    pub fn from_config(config: &Config, calendar_id: &str) -> Self {
        Self {
            calendar_id: calendar_id.to_string(),
            time_zone: config.frost.timezone.clone(),
            notification_email: config.calendar.notification_email.trim().to_string(),
            include_transplants: config.schedule.publish_transplants,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Ids of created events, in submission order
    pub created: Vec<String>,
}

impl PublishSummary {
    pub fn count(&self) -> usize {
        self.created.len()
    }
}

pub struct EventPublisher<'a> {
    client: &'a CalendarClient,
    settings: PublishSettings,
}

impl<'a> EventPublisher<'a> {
    pub fn new(client: &'a CalendarClient, settings: PublishSettings) -> Self {
        Self { client, settings }
    }

    /// Insert requests for one derived row: the planting event, then the
    /// transplant event when enabled and present.
    pub fn requests_for(&self, event: &DerivedEvent) -> Vec<NewEvent> {
        let mut requests = vec![self.request(&event.event_name, &event.start, &event.end)];

        if self.settings.include_transplants {
            if let Some(transplant) = &event.transplant {
                requests.push(self.request(&transplant.name, &transplant.at, &transplant.end()));
            }
        }

        requests
    }

    fn request(&self, summary: &str, start: &DateTime<Tz>, end: &DateTime<Tz>) -> NewEvent {
        NewEvent {
            summary: summary.to_string(),
            location: EVENT_LOCATION.to_string(),
            description: String::new(),
            start: self.event_time(start),
            end: self.event_time(end),
            attendees: vec![Attendee {
                email: self.settings.notification_email.clone(),
            }],
            reminders: Reminders::overrides(vec![
                ReminderOverride {
                    method: ReminderMethod::Email,
                    minutes: EMAIL_REMINDER_MINUTES,
                },
                ReminderOverride {
                    method: ReminderMethod::Popup,
                    minutes: POPUP_REMINDER_MINUTES,
                },
            ]),
        }
    }

    fn event_time(&self, at: &DateTime<Tz>) -> EventDateTime {
        EventDateTime {
            date_time: to_rfc3339(at),
            time_zone: self.settings.time_zone.clone(),
        }
    }

    /// Submit every event in order. The first failure stops the batch.
    pub async fn publish(&self, events: &[DerivedEvent]) -> Result<PublishSummary, CalendarError> {
        let mut summary = PublishSummary::default();

        for event in events {
            for request in self.requests_for(event) {
                let created = self
                    .client
                    .insert_event(&self.settings.calendar_id, &request)
                    .await?;
                tracing::info!("Created \"{}\" ({})", request.summary, created.id);
                summary.created.push(created.id);
            }
        }

        Ok(summary)
    }
}
