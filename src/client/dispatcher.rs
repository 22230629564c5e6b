//! Request dispatch.
//!
//! Ties authentication, path encoding and retry into a single execution:
//! resolve the bearer token, substitute path parameters, attach headers,
//! wrap the transport call in the policy resolved from the registry, and
//! classify the terminal outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::form_urlencoded;
use url::Url;

use crate::auth::TokenProvider;
use crate::client::paths::expand_path_template;
use crate::errors::{ApiError, SdkError, SdkResult};
use crate::retry::{RetryPolicy, RetryPolicyRegistry, DEFAULT_RATE_LIMIT_RETRIES};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::types::{ApiResponse, RequestOptions};

pub(crate) const APPLICATION_HEADER: &str = "X-Findata-Application";

/// Asynchronous request dispatcher shared by every generated API instance.
///
/// Holds only read-mostly state; request execution is fully independent per
/// call. Dropping an in-flight `execute` future cancels the underlying HTTP
/// call and any pending retry delay.
pub struct ApiClient {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) application_name: Option<String>,
    pub(crate) default_headers: HashMap<String, String>,
    pub(crate) rate_limit_retries: Option<u32>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) token_provider: Arc<dyn TokenProvider>,
    pub(crate) registry: Arc<RetryPolicyRegistry>,
}

impl ApiClient {
    pub(crate) fn new(
        base_url: Url,
        timeout: Duration,
        application_name: Option<String>,
        default_headers: HashMap<String, String>,
        rate_limit_retries: Option<u32>,
        transport: Arc<dyn HttpTransport>,
        token_provider: Arc<dyn TokenProvider>,
        registry: Arc<RetryPolicyRegistry>,
    ) -> Self {
        Self {
            base_url,
            timeout,
            application_name,
            default_headers,
            rate_limit_retries,
            transport,
            token_provider,
            registry,
        }
    }

    /// The provider used for the Authorization header.
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        Arc::clone(&self.token_provider)
    }

    /// Execute a request without a body.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
    ) -> SdkResult<ApiResponse> {
        self.execute_raw(method, path_template, options, None).await
    }

    /// Execute a request with a JSON body.
    pub async fn execute_with_body<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
        body: &B,
    ) -> SdkResult<ApiResponse> {
        let body =
            serde_json::to_string(body).map_err(|e| SdkError::Serialization(e.to_string()))?;
        self.execute_raw(method, path_template, options, Some(body))
            .await
    }

    /// Execute and deserialize the successful response body.
    pub async fn execute_json<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
    ) -> SdkResult<R> {
        self.execute(method, path_template, options).await?.json()
    }

    pub async fn execute_json_with_body<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
        body: &B,
    ) -> SdkResult<R> {
        self.execute_with_body(method, path_template, options, body)
            .await?
            .json()
    }

    async fn execute_raw(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: RequestOptions,
        body: Option<String>,
    ) -> SdkResult<ApiResponse> {
        let token = self.token_provider.get_authentication_token().await?;
        let request = self.build_request(method, path_template, &options, &token, body);
        let policy = self.resolve_async_policy(&options);

        let transport = Arc::clone(&self.transport);
        let outcome = policy
            .run_async(move || {
                let transport = Arc::clone(&transport);
                let request = request.clone();
                async move { transport.send(request).await }
            })
            .await;

        Self::classify(outcome, &options, path_template)
    }

    pub(crate) fn build_request(
        &self,
        method: HttpMethod,
        path_template: &str,
        options: &RequestOptions,
        token: &str,
        body: Option<String>,
    ) -> HttpRequest {
        let path = expand_path_template(path_template, &options.path_params);
        let mut url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if !options.query_params.is_empty() {
            let query: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(options.query_params.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = self.default_headers.clone();
        if let Some(application_name) = &self.application_name {
            headers.insert(APPLICATION_HEADER.to_string(), application_name.clone());
        }
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        if body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        for (name, value) in &options.header_params {
            headers.insert(name.clone(), value.clone());
        }

        HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: Some(options.timeout.unwrap_or(self.timeout)),
        }
    }

    fn resolve_async_policy(&self, options: &RequestOptions) -> RetryPolicy {
        let policy = if let Some(policy) = self.registry.async_policy() {
            (*policy).clone()
        } else if let Some(factory) = self.registry.async_factory() {
            factory(options)
        } else {
            self.default_policy()
        };
        Self::apply_call_overrides(policy, options)
    }

    pub(crate) fn resolve_sync_policy(&self, options: &RequestOptions) -> RetryPolicy {
        let policy = if let Some(policy) = self.registry.sync_policy() {
            (*policy).clone()
        } else if let Some(factory) = self.registry.sync_factory() {
            factory(options)
        } else {
            self.default_policy()
        };
        Self::apply_call_overrides(policy, options)
    }

    fn default_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_rate_limit_retries(
            self.rate_limit_retries.unwrap_or(DEFAULT_RATE_LIMIT_RETRIES),
        )
    }

    fn apply_call_overrides(mut policy: RetryPolicy, options: &RequestOptions) -> RetryPolicy {
        if let Some(retries) = options.rate_limit_retries {
            policy.rate_limit_retries = retries;
        }
        policy
    }

    /// Turn the terminal attempt's outcome into a typed result. The last
    /// observed response is surfaced verbatim, never masked.
    pub(crate) fn classify(
        outcome: Result<HttpResponse, SdkError>,
        options: &RequestOptions,
        path_template: &str,
    ) -> SdkResult<ApiResponse> {
        let response = outcome?;
        if response.is_success() {
            return Ok(ApiResponse {
                status: response.status,
                headers: response.headers,
                content: response.body,
            });
        }

        let operation = options.operation.as_deref().unwrap_or(path_template);
        tracing::debug!(status = response.status, operation, "request failed");
        Err(ApiError::new(response.status, format!("Error calling {operation}"))
            .with_error_content(response.body)
            .with_headers(response.headers)
            .into())
    }
}
