//! Google Calendar API client.

use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    /// Build a client for the Calendar v3 API using `access_token`.
    pub fn new(access_token: &str) -> Result<Self, CalendarError> {
        Self::with_base_url(access_token, CALENDAR_API_BASE)
    }

    /// Build a client against a different API root (used for mock servers).
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("garden-scheduler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List all calendars visible to the signed-in account, following pagination.
    #[instrument(skip(self), level = "info")]
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, CalendarError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/users/me/calendarList", self.base_url);
            if let Some(pt) = &page_token {
                url.push_str(&format!("?pageToken={}", urlencoding::encode(pt)));
            }

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let resp: CalendarListResponse = self.handle_response(response).await?;
            calendars.extend(resp.items.into_iter().map(Calendar::from));

            match resp.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Fetched {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Create a new event.
    #[instrument(skip(self, event), fields(summary = %event.summary), level = "info")]
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<CreatedEvent, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(event)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::InvalidEventData(text))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_event() -> NewEvent {
        let at = |date_time: &str| EventDateTime {
            date_time: date_time.to_string(),
            time_zone: "America/Chicago".to_string(),
        };
        NewEvent {
            summary: "Plant Tomato (Spring Indoor)".to_string(),
            location: "Garden".to_string(),
            description: String::new(),
            start: at("2023-02-27T08:00:00-06:00"),
            end: at("2023-02-27T11:00:00-06:00"),
            attendees: vec![Attendee {
                email: "gardener@example.com".to_string(),
            }],
            reminders: Reminders::overrides(vec![ReminderOverride {
                method: ReminderMethod::Popup,
                minutes: 10,
            }]),
        }
    }

    #[tokio::test]
    async fn test_list_calendars() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "primary", "summary": "My Calendar", "primary": true, "accessRole": "owner"},
                    {"id": "cal2", "summary": "Work", "accessRole": "writer"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
        let calendars = client.list_calendars().await.unwrap();

        assert_eq!(calendars.len(), 2);
        assert!(calendars[0].is_primary);
        assert_eq!(calendars[1].summary, "Work");
    }

    #[tokio::test]
    async fn test_list_calendars_follows_pages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "garden", "summary": "Garden", "accessRole": "owner"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "work", "summary": "Work", "accessRole": "writer"}],
                "nextPageToken": "page2"
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
        let calendars = client.list_calendars().await.unwrap();

        let names: Vec<_> = calendars.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(names, vec!["Work", "Garden"]);
    }

    #[tokio::test]
    async fn test_insert_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/garden%40group.calendar.google.com/events"))
            .and(header("Authorization", "Bearer test_token"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Plant Tomato (Spring Indoor)",
                "location": "Garden",
                "start": {"dateTime": "2023-02-27T08:00:00-06:00", "timeZone": "America/Chicago"},
                "reminders": {"useDefault": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "evt1",
                "summary": "Plant Tomato (Spring Indoor)",
                "status": "confirmed",
                "htmlLink": "https://calendar.google.com/event?eid=evt1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
        let created = client
            .insert_event("garden@group.calendar.google.com", &sample_event())
            .await
            .unwrap();

        assert_eq!(created.id, "evt1");
        assert_eq!(created.status.as_deref(), Some("confirmed"));
    }

    #[tokio::test]
    async fn test_insert_event_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/garden/events"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid attendee email."))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
        let result = client.insert_event("garden", &sample_event()).await;

        match result {
            Err(CalendarError::InvalidEventData(msg)) => assert!(msg.contains("attendee")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insert_event_unknown_calendar() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/missing/events"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
        let result = client.insert_event("missing", &sample_event()).await;

        // a 404 body is not a calendar name
        match result {
            Err(CalendarError::ApiError(msg)) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("Not Found"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_expired() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("expired_token", &mock_server.uri()).unwrap();
        let result = client.list_calendars().await;

        assert!(matches!(result, Err(CalendarError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "60"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("token", &mock_server.uri()).unwrap();
        let result = client.list_calendars().await;

        assert!(matches!(result, Err(CalendarError::RateLimited(60))));
    }
}
