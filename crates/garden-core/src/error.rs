//! Centralized error types for the garden scheduler.
//!
//! Each error carries a `user_message()` with a short, actionable hint that
//! the binary prints alongside the full error chain.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check garden.toml.",
            ConfigError::ParseError(_) => "garden.toml is malformed. Check its syntax.",
            ConfigError::UnknownTimezone(_) => {
                "Timezone must be an IANA name such as America/Chicago."
            }
        }
    }
}

/// Authentication errors (client secret, token cache, OAuth flow).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Client secret file not found: {0}")]
    ClientSecretNotFound(String),

    #[error("Invalid client secret file: {0}")]
    InvalidClientSecret(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("OAuth flow cancelled by user")]
    OAuthCancelled,

    #[error("CSRF token mismatch")]
    CsrfMismatch,

    #[error("Token storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::ClientSecretNotFound(_) => {
                "Download an OAuth client secret from Google Cloud Console into credentials.json."
            }
            AuthError::InvalidClientSecret(_) => {
                "credentials.json is not a Google OAuth client secret file."
            }
            AuthError::RefreshFailed(_) => "Your saved session could not be renewed.",
            AuthError::OAuthFailed(_) => "Sign-in failed. Please try again.",
            AuthError::OAuthCancelled => "Sign-in was cancelled.",
            AuthError::CsrfMismatch => "Sign-in response did not match the request. Try again.",
            AuthError::StorageError(_) => "Failed to save credentials. Check file permissions.",
        }
    }
}

/// The hint of the first config or auth error found in `err`'s chain.
pub fn user_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.user_message())
        } else {
            cause.downcast_ref::<AuthError>().map(AuthError::user_message)
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_user_messages_are_non_empty() {
        let config_errors = [
            ConfigError::Invalid("x".into()),
            ConfigError::ParseError("x".into()),
            ConfigError::UnknownTimezone("Mars/Olympus".into()),
        ];
        for err in &config_errors {
            assert!(!err.user_message().is_empty());
        }

        let auth_errors = [
            AuthError::ClientSecretNotFound("credentials.json".into()),
            AuthError::InvalidClientSecret("x".into()),
            AuthError::RefreshFailed("x".into()),
            AuthError::OAuthFailed("x".into()),
            AuthError::OAuthCancelled,
            AuthError::CsrfMismatch,
            AuthError::StorageError("x".into()),
        ];
        for err in &auth_errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ConfigError::UnknownTimezone("Mars/Olympus".into());
        assert!(err.to_string().contains("Mars/Olympus"));

        let err = AuthError::ClientSecretNotFound("credentials.json".into());
        assert!(err.to_string().contains("credentials.json"));
    }

    #[test]
    fn test_user_hint_finds_wrapped_errors() {
        let err = anyhow::Error::from(AuthError::OAuthCancelled).context("Google sign-in failed");
        assert_eq!(user_hint(&err), Some("Sign-in was cancelled."));

        let err = Err::<(), _>(ConfigError::Invalid("calendar.name: required".into()))
            .context("Failed to load garden.toml")
            .unwrap_err();
        assert_eq!(user_hint(&err), Some("Invalid configuration. Check garden.toml."));

        assert_eq!(user_hint(&anyhow::anyhow!("unrelated")), None);
    }
}
