pub mod config;
pub mod error;

pub use config::{
    CalendarConfig, Config, FilesConfig, FrostConfig, ScheduleConfig, ValidationResult,
};
pub use error::{user_hint, AuthError, ConfigError};

use anyhow::Result;

/// Initialize logging for the scheduler run
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Garden scheduler core initialized");
    Ok(())
}
