use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use reqwest::blocking::Client;
use tracing::debug;

use super::wire::{TokenErrorResponse, TokenResponse};
use crate::{config::OAuthCredentials, error::StorageError};


/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Used when the token endpoint doesn't say how long a token lives.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);


struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}


/// Exchanges an OAuth2 refresh token for access tokens and caches them until shortly before expiry.
pub(super) struct TokenSource {
    credentials: OAuthCredentials,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub(super) fn new(credentials: OAuthCredentials, token_url: String) -> Self {
        Self {
            credentials,
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, refreshing it first if needed.
    pub(super) fn access_token(&self, http: &Client) -> Result<String, StorageError> {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let fresh_token = self.refresh(http)?;
        let access_token = fresh_token.access_token.clone();
        *cached = Some(fresh_token);

        Ok(access_token)
    }

    /// Drops the cached token, forcing a refresh on the next request.
    pub(super) fn invalidate(&self) {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        *cached = None;
    }

    fn refresh(&self, http: &Client) -> Result<CachedToken, StorageError> {
        debug!(token_url = %self.token_url, "refreshing storage service access token");

        let response = http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|error| StorageError::Transport {
                error: Box::new(error),
            })?;

        let status = response.status();
        let body = response.text().map_err(|error| StorageError::Transport {
            error: Box::new(error),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(token_error) => match token_error.error_description {
                    Some(description) => format!("{}: {}", token_error.error, description),
                    None => token_error.error,
                },
                Err(_) => format!("token endpoint returned status {}", status.as_u16()),
            };

            return Err(StorageError::Authorization { message });
        }

        let token = serde_json::from_str::<TokenResponse>(&body).map_err(|error| {
            StorageError::UnexpectedResponse {
                message: format!("malformed token response: {error}"),
            }
        })?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}
