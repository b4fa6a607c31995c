use anyhow::{Context, Result};
use garden_core::AuthError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Seconds before `expires_at` at which a token is already treated as expired
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the token is expired or about to expire
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }

    /// Whether a refresh token is available for silent renewal
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

/// JSON token cache kept next to the schedule (`token.json` by default)
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store a token set, replacing any previous one
    pub fn store(&self, token_set: &TokenSet) -> Result<()> {
        let json = serde_json::to_string_pretty(token_set)
            .context("Failed to serialize token set")?;

        fs::write(&self.path, &json)
            .map_err(|e| AuthError::StorageError(e.to_string()))
            .with_context(|| format!("Failed to write token file {}", self.path.display()))?;

        tracing::info!("Stored token at {:?}", self.path);
        Ok(())
    }

    /// Load the cached token set, or None if no cache file exists
    pub fn load(&self) -> Result<Option<TokenSet>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .context("Failed to read token file")?;

        let token_set: TokenSet = serde_json::from_str(&json)
            .context("Failed to deserialize token set")?;

        tracing::debug!("Loaded cached token from {:?}", self.path);
        Ok(Some(token_set))
    }
}
