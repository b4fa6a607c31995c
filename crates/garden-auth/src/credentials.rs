//! Credential manager: cached token, silent refresh, or interactive sign-in.

use anyhow::Result;
use std::path::PathBuf;

use crate::client_secret::ClientSecret;
use crate::google::GoogleOAuth2Provider;
use crate::oauth::InstalledAppFlow;
use crate::storage::{TokenCache, TokenSet};

/// What the cached token allows us to do without user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// Cached token is still valid
    Valid,
    /// Cached token expired but carries a refresh token
    Refreshable,
    /// No usable cached token, the user has to sign in
    Missing,
}

impl TokenState {
    pub fn of(token: Option<&TokenSet>) -> Self {
        match token {
            Some(t) if !t.is_expired() => TokenState::Valid,
            Some(t) if t.can_refresh() => TokenState::Refreshable,
            _ => TokenState::Missing,
        }
    }
}

pub struct CredentialManager {
    client_secret_path: PathBuf,
    cache: TokenCache,
    scopes: Vec<String>,
}

impl CredentialManager {
    pub fn new(
        client_secret_path: impl Into<PathBuf>,
        token_cache_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_secret_path: client_secret_path.into(),
            cache: TokenCache::new(token_cache_path),
            scopes,
        }
    }

    /// Return a usable token, refreshing or re-authorizing when needed.
    ///
    /// Every newly obtained token is written back to the cache file.
    pub async fn token(&self) -> Result<TokenSet> {
        let cached = match self.cache.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable token cache: {:#}", e);
                None
            }
        };

        match (TokenState::of(cached.as_ref()), cached) {
            (TokenState::Valid, Some(token)) => {
                tracing::info!("Using cached Google token");
                Ok(token)
            }
            (TokenState::Refreshable, Some(token)) => match self.refresh(token).await {
                Ok(token) => Ok(token),
                Err(e) => {
                    tracing::warn!("Token refresh failed, signing in again: {:#}", e);
                    self.authorize().await
                }
            },
            _ => self.authorize().await,
        }
    }

    async fn refresh(&self, token: TokenSet) -> Result<TokenSet> {
        let secret = ClientSecret::from_file(&self.client_secret_path)?;
        let provider = GoogleOAuth2Provider::new(secret);

        let refresh_token = token.refresh_token.unwrap_or_default();
        let response = provider.refresh_token(&refresh_token).await?;
        let refreshed = response.into_token_set(Some(refresh_token));

        self.cache.store(&refreshed)?;
        tracing::info!("Refreshed Google token");
        Ok(refreshed)
    }

    async fn authorize(&self) -> Result<TokenSet> {
        let secret = ClientSecret::from_file(&self.client_secret_path)?;
        let flow = InstalledAppFlow::new(secret, self.scopes.clone());

        let token = flow.run_local_server().await?;
        self.cache.store(&token)?;
        Ok(token)
    }
}
