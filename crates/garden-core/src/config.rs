use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Config file name, resolved against the working directory
pub const CONFIG_FILE_NAME: &str = "garden.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Frost dates anchoring the schedule
    #[serde(default)]
    pub frost: FrostConfig,

    /// Target calendar and notification settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Input and credential file locations
    #[serde(default)]
    pub files: FilesConfig,

    /// Schedule publishing options
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrostConfig {
    /// Last spring frost, local wall-clock time in `timezone`
    pub last_frost: NaiveDateTime,

    /// First fall frost, local wall-clock time in `timezone`
    pub first_frost: NaiveDateTime,

    /// IANA timezone name, also used as the event timezone label
    pub timezone: String,
}

impl FrostConfig {
    /// Parse the configured timezone name.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }
}

impl Default for FrostConfig {
    fn default() -> Self {
        Self {
            last_frost: default_frost(2023, 4, 10),
            first_frost: default_frost(2023, 10, 29),
            timezone: "America/Chicago".to_string(),
        }
    }
}

fn default_frost(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Display name of the calendar receiving the events
    pub name: String,

    /// Attendee address that receives the reminder emails
    pub notification_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Planting schedule CSV
    #[serde(default = "default_schedule_path")]
    pub schedule: PathBuf,

    /// OAuth client secret downloaded from Google Cloud Console
    #[serde(default = "default_client_secret_path")]
    pub client_secret: PathBuf,

    /// Cached access/refresh token
    #[serde(default = "default_token_cache_path")]
    pub token_cache: PathBuf,
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("garden_scheduler.csv")
}

fn default_client_secret_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_cache_path() -> PathBuf {
    PathBuf::from("token.json")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule_path(),
            client_secret: default_client_secret_path(),
            token_cache: default_token_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Also create an event for each transplant date
    #[serde(default)]
    pub publish_transplants: bool,
}

impl Config {
    /// Load `garden.toml` from the working directory, creating a default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load configuration from `path`, creating a default there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::warn!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load()?.into_validated()
    }

    /// Validate an already loaded configuration, logging warnings
    pub fn into_validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()))
                .context("Configuration validation failed");
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(e) = self.frost.tz() {
            result.add_error("frost.timezone", e.to_string());
        }

        if self.frost.first_frost <= self.frost.last_frost {
            result.add_error(
                "frost.first_frost",
                "First fall frost must come after the last spring frost",
            );
        }

        if self.calendar.name.trim().is_empty() {
            result.add_error("calendar.name", "Target calendar name is not set");
        }

        let email = self.calendar.notification_email.trim();
        if email.is_empty() {
            result.add_error("calendar.notification_email", "Notification email is not set");
        } else if !email.contains('@') {
            result.add_error(
                "calendar.notification_email",
                format!("Not an email address: {}", email),
            );
        }

        if !self.files.schedule.exists() {
            result.add_warning(
                "files.schedule",
                format!("Path does not exist: {}", self.files.schedule.display()),
            );
        }

        result
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}
