use anyhow::{Context, Result};
use garden_core::AuthError;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::client_secret::ClientSecret;
use crate::storage::TokenSet;

/// Parameters Google appends to the loopback redirect.
#[derive(Debug, Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

/// A prepared authorization request, waiting for the user to consent.
pub struct AuthorizationRequest {
    pub url: String,
    csrf_token: CsrfToken,
    pkce_verifier: PkceCodeVerifier,
}

/// Browser-based authorization for installed applications
///
/// Binds a loopback callback server on an ephemeral port, opens the consent
/// page and exchanges the returned code for tokens.
pub struct InstalledAppFlow {
    secret: ClientSecret,
    scopes: Vec<String>,
}

impl InstalledAppFlow {
    pub fn new(secret: ClientSecret, scopes: Vec<String>) -> Self {
        Self { secret, scopes }
    }

    fn client(&self, redirect_uri: &str) -> Result<BasicClient> {
        Ok(BasicClient::new(
            ClientId::new(self.secret.client_id.clone()),
            Some(OAuthClientSecret::new(self.secret.client_secret.clone())),
            AuthUrl::new(self.secret.auth_uri.clone()).context("Invalid auth URL")?,
            Some(TokenUrl::new(self.secret.token_uri.clone()).context("Invalid token URL")?),
        )
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string()).context("Invalid redirect URI")?))
    }

    /// Build the consent URL for a callback listening on `port`
    pub fn authorization_request(&self, port: u16) -> Result<AuthorizationRequest> {
        let client = self.client(&redirect_uri(port))?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        // offline access is what yields a refresh token
        let (auth_url, csrf_token) = auth_request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        Ok(AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_token,
            pkce_verifier,
        })
    }

    /// Run the full flow: callback server, browser, code exchange
    pub async fn run_local_server(&self) -> Result<TokenSet> {
        let (tx, rx) = oneshot::channel();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));

        let routes = warp::get()
            .and(warp::path::end())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(|params: HashMap<String, String>, tx: CallbackSender| async move {
                let callback = CallbackParams {
                    code: params.get("code").cloned(),
                    state: params.get("state").cloned(),
                    error: params.get("error").cloned(),
                };

                if let Some(sender) = tx.lock().await.take() {
                    let _ = sender.send(callback);
                }

                Ok::<_, warp::Rejection>(warp::reply::html(
                    "<html><body><h1>Authorization complete</h1><p>You can close this window and return to the garden scheduler.</p></body></html>",
                ))
            });

        let (addr, server) = warp::serve(routes)
            .try_bind_ephemeral(([127, 0, 0, 1], 0))
            .map_err(|e| AuthError::OAuthFailed(format!("callback server: {}", e)))?;
        let server = tokio::spawn(server);

        let request = self.authorization_request(addr.port())?;

        tracing::info!("Opening browser for Google authorization...");
        tracing::info!("If it does not open, visit: {}", request.url);
        if let Err(e) = webbrowser::open(&request.url) {
            tracing::warn!("Failed to open browser: {}", e);
        }

        let callback = rx.await.context("Failed to receive OAuth callback");
        server.abort();
        let callback = callback?;

        let code = verify_callback(callback, request.csrf_token.secret())?;
        self.exchange_code(code, addr.port(), request.pkce_verifier).await
    }

    async fn exchange_code(
        &self,
        code: String,
        port: u16,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<TokenSet> {
        let client = self.client(&redirect_uri(port))?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::OAuthFailed(e.to_string()))
            .context("Failed to exchange authorization code")?;

        let expires_in = token_result
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(3600);

        let scopes = token_result
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_else(|| self.scopes.clone());

        tracing::info!("Google authorization completed");
        Ok(TokenSet {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
            scopes,
        })
    }
}

fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{}/", port)
}

/// Check the redirect for a user denial and the CSRF state, returning the code.
fn verify_callback(callback: CallbackParams, expected_state: &str) -> Result<String> {
    if let Some(error) = callback.error {
        if error == "access_denied" {
            return Err(AuthError::OAuthCancelled.into());
        }
        return Err(AuthError::OAuthFailed(error).into());
    }

    if callback.state.as_deref() != Some(expected_state) {
        return Err(AuthError::CsrfMismatch.into());
    }

    callback
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::OAuthFailed("callback did not include a code".into()).into())
}
