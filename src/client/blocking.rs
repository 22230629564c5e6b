//! Blocking execution facade.
//!
//! Drives the shared dispatcher on an owned current-thread runtime, the way
//! blocking HTTP clients wrap their async core. Retry delays are slept on the
//! calling thread, and policies come from the registry's synchronous slots.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::errors::{ConfigurationError, SdkError, SdkResult};
use crate::transport::HttpMethod;
use crate::types::{ApiResponse, RequestOptions};

/// Blocking twin of [`ApiClient`] with identical request semantics.
///
/// Must not be used from within an async runtime; hand async callers the
/// [`ApiClient`] instead.
pub struct BlockingApiClient {
    inner: Arc<ApiClient>,
    runtime: tokio::runtime::Runtime,
}

impl BlockingApiClient {
    pub(crate) fn new(inner: Arc<ApiClient>) -> SdkResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConfigurationError::InvalidConfig {
                message: format!("failed to initialize blocking runtime: {e}"),
            })?;
        Ok(Self { inner, runtime })
    }

    pub fn execute(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
    ) -> SdkResult<ApiResponse> {
        self.execute_raw(method, path_template, options, None)
    }

    pub fn execute_with_body<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
        body: &B,
    ) -> SdkResult<ApiResponse> {
        let body =
            serde_json::to_string(body).map_err(|e| SdkError::Serialization(e.to_string()))?;
        self.execute_raw(method, path_template, options, Some(body))
    }

    pub fn execute_json<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
    ) -> SdkResult<R> {
        self.execute(method, path_template, options)?.json()
    }

    fn execute_raw(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
        body: Option<String>,
    ) -> SdkResult<ApiResponse> {
        let token = self
            .runtime
            .block_on(self.inner.token_provider.get_authentication_token())?;
        let request = self
            .inner
            .build_request(method, path_template, &options, &token, body);
        let policy = self.inner.resolve_sync_policy(&options);

        let outcome = policy.run_blocking(|| {
            self.runtime
                .block_on(self.inner.transport.send(request.clone()))
        });

        ApiClient::classify(outcome, &options, path_template)
    }
}
