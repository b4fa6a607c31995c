//! Integration tests for the schedule pipeline using wiremock.
//!
//! CSV text goes through the reader and transformer, then the publisher
//! submits against a mock Calendar API.

#![allow(clippy::unwrap_used)]

use chrono_tz::America::Chicago;
use garden_calendar::{CalendarClient, CalendarError};
use garden_schedule::{
    derive_events, read_schedule, EventPublisher, FrostDates, PublishSettings,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEDULE: &str = "\
Vegetable,Season,Seed Start,Seed Start Weeks,Transplant Start Weeks
Tomato,Spring,Indoor,6,2
Carrot,Spring,Direct Sow,3,
Pepper,Spring,Indoor,8,2
";

fn frost() -> FrostDates {
    let at = |m, d| {
        chrono::NaiveDate::from_ymd_opt(2023, m, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    };
    FrostDates::new(Chicago, at(4, 10), at(10, 29)).unwrap()
}

fn settings(include_transplants: bool) -> PublishSettings {
    PublishSettings {
        calendar_id: "garden".to_string(),
        time_zone: "America/Chicago".to_string(),
        notification_email: "gardener@example.com".to_string(),
        include_transplants,
    }
}

fn created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": id,
        "status": "confirmed"
    }))
}

async fn mount_event(server: &MockServer, summary: &str, start: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/calendars/garden/events"))
        .and(body_partial_json(serde_json::json!({
            "summary": summary,
            "location": "Garden",
            "start": {"dateTime": start, "timeZone": "America/Chicago"},
            "attendees": [{"email": "gardener@example.com"}]
        })))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_publishes_one_event_per_row() {
    let mock_server = MockServer::start().await;

    mount_event(&mock_server, "Plant Tomato (Spring Indoor)", "2023-02-27T08:00:00-06:00", created("tomato"), 1).await;
    mount_event(&mock_server, "Plant Carrot (Spring Direct Sow)", "2023-03-20T08:00:00-05:00", created("carrot"), 1).await;
    mount_event(&mock_server, "Plant Pepper (Spring Indoor)", "2023-02-13T08:00:00-06:00", created("pepper"), 1).await;

    let rows = read_schedule(SCHEDULE.as_bytes()).unwrap();
    let events = derive_events(&rows, &frost()).unwrap();

    let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
    let summary = EventPublisher::new(&client, settings(false))
        .publish(&events)
        .await
        .unwrap();

    assert_eq!(summary.created, vec!["tomato", "carrot", "pepper"]);
}

#[tokio::test]
async fn test_publishes_transplants_when_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/garden/events"))
        .respond_with(created("evt"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let rows = read_schedule(SCHEDULE.as_bytes()).unwrap();
    let events = derive_events(&rows, &frost()).unwrap();

    let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
    let summary = EventPublisher::new(&client, settings(true))
        .publish(&events)
        .await
        .unwrap();

    // three plantings plus transplants for tomato and pepper
    assert_eq!(summary.count(), 5);
}

#[tokio::test]
async fn test_failure_stops_remaining_rows() {
    let mock_server = MockServer::start().await;

    mount_event(&mock_server, "Plant Tomato (Spring Indoor)", "2023-02-27T08:00:00-06:00", created("tomato"), 1).await;
    mount_event(
        &mock_server,
        "Plant Carrot (Spring Direct Sow)",
        "2023-03-20T08:00:00-05:00",
        ResponseTemplate::new(500).set_body_string("backend error"),
        1,
    )
    .await;
    mount_event(&mock_server, "Plant Pepper (Spring Indoor)", "2023-02-13T08:00:00-06:00", created("pepper"), 0).await;

    let rows = read_schedule(SCHEDULE.as_bytes()).unwrap();
    let events = derive_events(&rows, &frost()).unwrap();

    let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
    let result = EventPublisher::new(&client, settings(false)).publish(&events).await;

    assert!(matches!(result, Err(CalendarError::ApiError(msg)) if msg.contains("backend error")));
}

#[tokio::test]
async fn test_empty_schedule_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(created("unexpected"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = CalendarClient::with_base_url("test_token", &mock_server.uri()).unwrap();
    let summary = EventPublisher::new(&client, settings(true))
        .publish(&[])
        .await
        .unwrap();

    assert_eq!(summary.count(), 0);
}
