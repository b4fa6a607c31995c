use anyhow::{Context, Result};
use garden_auth::{CredentialManager, CALENDAR_SCOPE};
use garden_calendar::{find_calendar, CalendarClient, CalendarError};
use garden_core::Config;
use garden_schedule::{derive_events, read_schedule_file, EventPublisher, FrostDates, PublishSettings};

#[tokio::main]
async fn main() -> Result<()> {
    garden_core::init()?;

    let (config, _warnings) = Config::load_validated().map_err(hint)?;

    let credentials = CredentialManager::new(
        &config.files.client_secret,
        &config.files.token_cache,
        vec![CALENDAR_SCOPE.to_string()],
    );
    let token = match credentials.token().await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("An error occurred: {:#}", e);
            return Err(hint(e.context("Google sign-in failed")));
        }
    };

    let client = match CalendarClient::new(&token.access_token) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("An error occurred: {}", e);
            return Err(e).context("Failed to build calendar client");
        }
    };

    let calendars = client.list_calendars().await.map_err(report)?;
    let calendar = find_calendar(&calendars, &config.calendar.name)
        .ok_or_else(|| CalendarError::CalendarNotFound(config.calendar.name.clone()))
        .map_err(report)?;
    if !calendar.access_role.can_write() {
        tracing::warn!(
            "Calendar \"{}\" is {:?}; inserts will likely be rejected",
            calendar.summary,
            calendar.access_role
        );
    }
    tracing::info!("Publishing to calendar \"{}\" ({})", calendar.summary, calendar.id);

    let frost = FrostDates::from_config(&config.frost)?;
    tracing::info!(
        "Last frost {}, first frost {} ({} day season)",
        frost.last_frost,
        frost.first_frost,
        frost.growing_season().num_days()
    );

    let rows = read_schedule_file(&config.files.schedule)?;
    let events = derive_events(&rows, &frost)?;

    let publisher = EventPublisher::new(&client, PublishSettings::from_config(&config, &calendar.id));
    let summary = publisher.publish(&events).await.map_err(report)?;

    tracing::info!("Created {} calendar events from {} rows", summary.count(), rows.len());
    Ok(())
}

/// Log the config or auth hint, if any, before the error leaves `main`.
fn hint(e: anyhow::Error) -> anyhow::Error {
    if let Some(message) = garden_core::user_hint(&e) {
        tracing::error!("{}", message);
    }
    e
}

/// Log the user-facing hint before the error propagates out of `main`.
fn report(e: CalendarError) -> anyhow::Error {
    tracing::error!("{}", e.user_message());
    e.into()
}
