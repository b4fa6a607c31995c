//! OAuth client secret file as downloaded from Google Cloud Console.

use anyhow::{Context, Result};
use garden_core::AuthError;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Client credentials used to start the authorization flow and refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google wraps the credentials in an `installed` or `web` object.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read a client secret file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuthError::ClientSecretNotFound(path.display().to_string()).into());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json(&json)
    }

    /// Parse the contents of a client secret file.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidClientSecret(e.to_string()))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| {
                AuthError::InvalidClientSecret("expected an \"installed\" or \"web\" section".into())
                    .into()
            })
    }
}
