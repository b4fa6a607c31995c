//! Google OAuth2 credentials for the garden scheduler.
//!
//! Reads the client secret downloaded from Google Cloud Console, caches the
//! resulting token in a JSON file and refreshes or re-authorizes as needed.

pub mod client_secret;
pub mod credentials;
pub mod google;
pub mod oauth;
pub mod storage;

pub use client_secret::ClientSecret;
pub use credentials::{CredentialManager, TokenState};
pub use google::{GoogleOAuth2Provider, GoogleTokenResponse};
pub use oauth::InstalledAppFlow;
pub use storage::{TokenCache, TokenSet};

/// OAuth scope granting read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
