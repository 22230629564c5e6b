//! Client factory: fail-fast validation and wiring.

use std::sync::Arc;

use secrecy::ExposeSecret;
use url::Url;

use crate::api::{InstrumentsApi, PortfoliosApi};
use crate::auth::{
    ClientCredentialsConfig, ClientCredentialsTokenProvider, StaticTokenProvider, TokenProvider,
};
use crate::client::{ApiClient, ApiConfiguration, BlockingApiClient};
use crate::errors::{ConfigurationError, SdkResult};
use crate::retry::{RetryPolicy, RetryPolicyRegistry, DEFAULT_RATE_LIMIT_RETRIES};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Builds the shared dispatcher and hands out per-resource API instances.
///
/// Construction validates URLs and settings before any request is attempted,
/// selects the token provider variant (a personal access token wins over
/// client credentials) and installs default retry policies into empty
/// registry slots. An already-populated slot is never overwritten, so a
/// customization installed before the first factory persists across later
/// factory constructions.
pub struct ApiClientFactory {
    client: Arc<ApiClient>,
}

impl std::fmt::Debug for ApiClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientFactory").finish_non_exhaustive()
    }
}

impl ApiClientFactory {
    /// Construct against the process-wide policy registry.
    pub fn new(configuration: ApiConfiguration) -> SdkResult<Self> {
        Self::with_registry(configuration, RetryPolicyRegistry::shared())
    }

    /// Construct against a caller-owned registry (test isolation).
    pub fn with_registry(
        configuration: ApiConfiguration,
        registry: Arc<RetryPolicyRegistry>,
    ) -> SdkResult<Self> {
        configuration.validate()?;

        let base_url = Url::parse(configuration.base_url.trim()).map_err(|source| {
            ConfigurationError::InvalidUrl {
                kind: "base",
                url: configuration.base_url.clone(),
                source,
            }
        })?;

        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(configuration.timeout));
        let token_provider = Self::build_token_provider(&configuration, Arc::clone(&transport))?;

        let default_policy = RetryPolicy::default().with_rate_limit_retries(
            configuration
                .rate_limit_retries
                .unwrap_or(DEFAULT_RATE_LIMIT_RETRIES),
        );
        registry.install_sync_default(default_policy.clone());
        registry.install_async_default(default_policy);

        let client = Arc::new(ApiClient::new(
            base_url,
            configuration.timeout,
            configuration.application_name,
            configuration.default_headers,
            configuration.rate_limit_retries,
            transport,
            token_provider,
            registry,
        ));

        Ok(Self { client })
    }

    fn build_token_provider(
        configuration: &ApiConfiguration,
        transport: Arc<dyn HttpTransport>,
    ) -> SdkResult<Arc<dyn TokenProvider>> {
        if let Some(token) = &configuration.personal_access_token {
            return Ok(Arc::new(StaticTokenProvider::new(
                token.expose_secret().clone(),
            )));
        }

        let missing = |field: &str| ConfigurationError::MissingRequired {
            field: field.to_string(),
        };
        let token_url_raw = configuration
            .token_url
            .as_deref()
            .ok_or_else(|| missing("token_url"))?;
        let token_url =
            Url::parse(token_url_raw.trim()).map_err(|source| ConfigurationError::InvalidUrl {
                kind: "token",
                url: token_url_raw.to_string(),
                source,
            })?;

        let config = ClientCredentialsConfig {
            token_url,
            client_id: configuration
                .client_id
                .clone()
                .ok_or_else(|| missing("client_id"))?,
            client_secret: configuration
                .client_secret
                .clone()
                .ok_or_else(|| missing("client_secret"))?,
            username: configuration.username.clone(),
            password: configuration.password.clone(),
            scope: None,
            timeout: configuration.timeout,
        };

        Ok(Arc::new(ClientCredentialsTokenProvider::new(
            config, transport,
        )))
    }

    /// The shared asynchronous dispatcher.
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }

    /// A blocking dispatcher over the same configuration.
    pub fn blocking_client(&self) -> SdkResult<BlockingApiClient> {
        BlockingApiClient::new(self.client())
    }

    pub fn portfolios(&self) -> PortfoliosApi {
        PortfoliosApi::new(self.client())
    }

    pub fn instruments(&self) -> InstrumentsApi {
        InstrumentsApi::new(self.client())
    }
}
