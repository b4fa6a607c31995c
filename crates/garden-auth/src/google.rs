//! Google OAuth2 token endpoint calls.

use anyhow::{Context, Result};
use garden_core::AuthError;
use serde::{Deserialize, Serialize};

use crate::client_secret::ClientSecret;
use crate::storage::TokenSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl GoogleTokenResponse {
    /// Convert into a cacheable token set.
    ///
    /// Google omits the refresh token on refresh responses, so the previous one is kept.
    pub fn into_token_set(self, previous_refresh_token: Option<String>) -> TokenSet {
        let expires_at = chrono::Utc::now().timestamp() + self.expires_in as i64;
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expires_at,
            scopes: self
                .scope
                .split_whitespace()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct GoogleOAuth2Provider {
    secret: ClientSecret,
    client: reqwest::Client,
}

impl GoogleOAuth2Provider {
    pub fn new(secret: ClientSecret) -> Self {
        Self {
            secret,
            client: reqwest::Client::new(),
        }
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(&[
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(error_text).into());
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .context("Failed to parse refresh response")
    }
}
