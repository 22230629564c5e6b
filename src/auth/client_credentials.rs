//! Client-credentials token provider.
//!
//! First call exchanges client credentials at the token endpoint; afterwards
//! the cached token is returned until its expiry instant passes. An expired
//! credential is refreshed with the cached refresh token when one exists, and
//! a rejected refresh falls back to a full re-exchange. A single async mutex
//! guards the fetch-or-refresh critical section, so concurrent callers at
//! expiry observe exactly one network call and share its result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::Mutex;
use url::form_urlencoded;
use url::Url;

use crate::auth::{Credential, TokenProvider};
use crate::errors::{AuthenticationError, SdkResult};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport};
use crate::types::TokenResponse;

/// Margin subtracted from the server-supplied lifetime to avoid races at the
/// expiry boundary.
const EXPIRY_SAFETY_MARGIN_SECS: u64 = 30;

/// Settings bundle for the token endpoint exchange.
#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Resource-owner password grant is used when both are present.
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub scope: Option<String>,
    pub timeout: Duration,
}

/// OAuth2 token provider caching one [`Credential`] per instance.
pub struct ClientCredentialsTokenProvider {
    config: ClientCredentialsConfig,
    transport: Arc<dyn HttpTransport>,
    credential: Mutex<Option<Credential>>,
}

impl ClientCredentialsTokenProvider {
    pub fn new(config: ClientCredentialsConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            credential: Mutex::new(None),
        }
    }

    /// Snapshot of the cached credential, if one has been issued.
    pub async fn current_credential(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }

    /// Force the cached token to be considered expired, so the next call
    /// re-acquires. Operational/test hook.
    pub async fn expire_token(&self) {
        if let Some(credential) = self.credential.lock().await.as_mut() {
            credential.expires_on = Some(Utc::now() - ChronoDuration::seconds(1));
        }
    }

    /// Replace the cached refresh token. Operational/test hook for refresh
    /// failure drills.
    pub async fn override_refresh_token(&self, refresh_token: Option<String>) {
        if let Some(credential) = self.credential.lock().await.as_mut() {
            credential.refresh_token = refresh_token;
        }
    }

    fn exchange_body(&self) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                form.append_pair("grant_type", "password");
                form.append_pair("username", username);
                form.append_pair("password", password.expose_secret());
            }
            _ => {
                form.append_pair("grant_type", "client_credentials");
            }
        }
        form.append_pair("client_id", &self.config.client_id);
        form.append_pair("client_secret", self.config.client_secret.expose_secret());
        if let Some(scope) = &self.config.scope {
            form.append_pair("scope", scope);
        }
        form.finish()
    }

    fn refresh_body(&self, refresh_token: &str) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "refresh_token");
        form.append_pair("refresh_token", refresh_token);
        form.append_pair("client_id", &self.config.client_id);
        form.append_pair("client_secret", self.config.client_secret.expose_secret());
        form.finish()
    }

    fn token_request(&self, body: String) -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        HttpRequest {
            method: HttpMethod::Post,
            url: self.config.token_url.to_string(),
            headers,
            body: Some(body),
            timeout: Some(self.config.timeout),
        }
    }

    /// Single token-endpoint call. Deliberately not wrapped in any retry
    /// policy: backoff belongs to the outer API call only.
    async fn request_token(&self, body: String, is_refresh: bool) -> SdkResult<TokenResponse> {
        let response = self.transport.send(self.token_request(body)).await?;

        if !response.is_success() {
            let error = if is_refresh {
                AuthenticationError::RefreshFailed {
                    status: response.status,
                    body: response.body,
                }
            } else {
                AuthenticationError::ExchangeFailed {
                    status: response.status,
                    body: response.body,
                }
            };
            return Err(error.into());
        }

        let token_response: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            AuthenticationError::InvalidTokenResponse {
                message: e.to_string(),
            }
        })?;

        if token_response.access_token.is_empty() {
            return Err(AuthenticationError::InvalidTokenResponse {
                message: "access_token is empty".to_string(),
            }
            .into());
        }

        Ok(token_response)
    }

    fn credential_from(response: TokenResponse, previous_refresh: Option<String>) -> Credential {
        let expires_on = response.expires_in.map(|lifetime| {
            let usable = lifetime.saturating_sub(EXPIRY_SAFETY_MARGIN_SECS);
            Utc::now() + ChronoDuration::seconds(usable as i64)
        });
        Credential {
            access_token: response.access_token,
            // Providers may omit the refresh token on refresh; keep the old one.
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_on,
        }
    }

    /// Refresh-or-exchange under the caller's lock; returns the new token.
    async fn acquire(&self, slot: &mut Option<Credential>) -> SdkResult<String> {
        if let Some(refresh_token) = slot.as_ref().and_then(|c| c.refresh_token.clone()) {
            match self
                .request_token(self.refresh_body(&refresh_token), true)
                .await
            {
                Ok(response) => {
                    let credential = Self::credential_from(response, Some(refresh_token));
                    let token = credential.access_token.clone();
                    tracing::debug!(expires_on = ?credential.expires_on, "access token refreshed");
                    *slot = Some(credential);
                    return Ok(token);
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "token refresh rejected, falling back to client credentials exchange"
                    );
                }
            }
        }

        let response = self.request_token(self.exchange_body(), false).await?;
        let credential = Self::credential_from(response, None);
        let token = credential.access_token.clone();
        tracing::debug!(expires_on = ?credential.expires_on, "access token issued");
        *slot = Some(credential);
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn get_authentication_token(&self) -> SdkResult<String> {
        let mut slot = self.credential.lock().await;
        if let Some(credential) = slot.as_ref() {
            if credential.is_valid_at(Utc::now()) {
                return Ok(credential.access_token.clone());
            }
        }
        self.acquire(&mut slot).await
    }
}
