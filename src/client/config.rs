//! Resolved client configuration.
//!
//! The SDK consumes an already-resolved settings bundle; loading from secrets
//! files is an application concern. `from_env` covers the common
//! environment-variable deployment shape.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};

use crate::errors::{ConfigurationError, SdkResult};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings bundle consumed by [`ApiClientFactory`](crate::client::ApiClientFactory).
///
/// Created once per logical client configuration and shared read-only by many
/// concurrent requests. Either a personal access token or a full set of
/// client credentials (token URL, client id, client secret) must be present.
#[derive(Debug, Clone)]
pub struct ApiConfiguration {
    pub base_url: String,
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    /// Long-lived pre-issued token; takes precedence over client credentials.
    pub personal_access_token: Option<Secret<String>>,
    /// Reported to the platform in the `X-Findata-Application` header when set.
    pub application_name: Option<String>,
    pub timeout: Duration,
    /// Configuration-level rate-limit retry budget; per-call options win.
    pub rate_limit_retries: Option<u32>,
    pub default_headers: HashMap<String, String>,
}

impl ApiConfiguration {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_url: None,
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            personal_access_token: None,
            application_name: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit_retries: None,
            default_headers: HashMap::new(),
        }
    }

    /// Read configuration from `FINDATA_*` environment variables.
    ///
    /// `FINDATA_BASE_URL` is required; the remainder (`FINDATA_TOKEN_URL`,
    /// `FINDATA_CLIENT_ID`, `FINDATA_CLIENT_SECRET`, `FINDATA_USERNAME`,
    /// `FINDATA_PASSWORD`, `FINDATA_ACCESS_TOKEN`, `FINDATA_APP_NAME`,
    /// `FINDATA_TIMEOUT_MS`, `FINDATA_RATE_LIMIT_RETRIES`) are optional.
    pub fn from_env() -> SdkResult<Self> {
        let base_url = std::env::var("FINDATA_BASE_URL").map_err(|_| {
            ConfigurationError::MissingRequired {
                field: "FINDATA_BASE_URL".to_string(),
            }
        })?;

        let mut config = Self::new(base_url);
        config.token_url = std::env::var("FINDATA_TOKEN_URL").ok();
        config.client_id = std::env::var("FINDATA_CLIENT_ID").ok();
        config.client_secret = std::env::var("FINDATA_CLIENT_SECRET").ok().map(Secret::new);
        config.username = std::env::var("FINDATA_USERNAME").ok();
        config.password = std::env::var("FINDATA_PASSWORD").ok().map(Secret::new);
        config.personal_access_token = std::env::var("FINDATA_ACCESS_TOKEN").ok().map(Secret::new);
        config.application_name = std::env::var("FINDATA_APP_NAME").ok();

        if let Ok(timeout_ms) = std::env::var("FINDATA_TIMEOUT_MS") {
            let millis: u64 =
                timeout_ms
                    .parse()
                    .map_err(|_| ConfigurationError::InvalidConfig {
                        message: format!("FINDATA_TIMEOUT_MS is not a number: {timeout_ms}"),
                    })?;
            config.timeout = Duration::from_millis(millis);
        }

        if let Ok(retries) = std::env::var("FINDATA_RATE_LIMIT_RETRIES") {
            let count: u32 = retries
                .parse()
                .map_err(|_| ConfigurationError::InvalidConfig {
                    message: format!("FINDATA_RATE_LIMIT_RETRIES is not a number: {retries}"),
                })?;
            config.rate_limit_retries = Some(count);
        }

        Ok(config)
    }

    /// Fail fast on settings no request could succeed with.
    pub fn validate(&self) -> SdkResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired {
                field: "base_url".to_string(),
            }
            .into());
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        let has_access_token = self
            .personal_access_token
            .as_ref()
            .map(|t| !t.expose_secret().is_empty())
            .unwrap_or(false);
        if has_access_token {
            return Ok(());
        }

        for (field, present) in [
            ("token_url", self.token_url.is_some()),
            ("client_id", self.client_id.is_some()),
            ("client_secret", self.client_secret.is_some()),
        ] {
            if !present {
                return Err(ConfigurationError::MissingRequired {
                    field: field.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(Secret::new(client_secret.into()));
        self
    }

    pub fn with_user_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(Secret::new(password.into()));
        self
    }

    pub fn with_personal_access_token(mut self, token: impl Into<String>) -> Self {
        self.personal_access_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate_limit_retries(mut self, retries: u32) -> Self {
        self.rate_limit_retries = Some(retries);
        self
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}
