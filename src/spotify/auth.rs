//! Client-credentials token handling.
//!
//! The token is the only state shared between concurrent catalog calls. All
//! acquisition goes through one async mutex, so a burst of first requests
//! performs a single token fetch and the rest reuse its result.

use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::models::{SpotifyError, TokenResponse};
use crate::config::TOKEN_EXPIRY_MARGIN_SECONDS;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    /// Build a token that expires a safety margin before the server's deadline.
    pub fn from_response(resp: TokenResponse, now: Instant) -> Self {
        let lifetime = resp.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECONDS);
        Self {
            value: resp.access_token,
            expires_at: now + Duration::from_secs(lifetime),
        }
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct TokenCache {
    client_id: String,
    client_secret: String,
    accounts_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(client_id: &str, client_secret: &str, accounts_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            accounts_url: accounts_url.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one if missing or expired.
    pub async fn bearer(&self, http: &Client) -> Result<String, SpotifyError> {
        self.bearer_with(|| self.request_token(http)).await
    }

    /// Single-flight core of [`bearer`](Self::bearer): the lock is held for
    /// the whole fetch, so waiters observe the fresh token instead of
    /// starting fetches of their own.
    pub async fn bearer_with<F, Fut>(&self, fetch: F) -> Result<String, SpotifyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, SpotifyError>>,
    {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(Instant::now()) {
                return Ok(token.value.clone());
            }
            log::debug!("Spotify token expired, refreshing");
        }

        let fresh = fetch().await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Drop the cached token (e.g. after a 401).
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self, http: &Client) -> Result<AccessToken, SpotifyError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(SpotifyError::Auth("client credentials are not configured".to_string()));
        }

        let resp = http
            .post(&self.accounts_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("HTTP {} - {}", status, text)));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SpotifyError::ParseError(format!("token response: {}", e)))?;

        log::info!("Acquired Spotify access token (expires in {}s)", body.expires_in);
        Ok(AccessToken::from_response(body, Instant::now()))
    }
}
