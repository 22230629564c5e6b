//! Shared request and response value types.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{SdkError, SdkResult};

/// Per-call overrides passed alongside every dispatched request.
///
/// Parameter values are raw, un-escaped strings; escaping is applied by the
/// dispatcher. Created per call and discarded when the call returns.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Operation name used in error messages and policy-factory decisions.
    pub operation: Option<String>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub header_params: HashMap<String, String>,
    /// Per-call timeout, taking precedence over the configured one.
    pub timeout: Option<Duration>,
    /// Per-call rate-limit retry budget, taking precedence over the
    /// configured and built-in defaults.
    pub rate_limit_retries: Option<u32>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_header_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_params.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_rate_limit_retries(mut self, retries: u32) -> Self {
        self.rate_limit_retries = Some(retries);
        self
    }
}

/// Token endpoint response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Raw successful outcome of a dispatched request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub content: String,
}

impl ApiResponse {
    /// Deserialize the response body.
    pub fn json<T: DeserializeOwned>(&self) -> SdkResult<T> {
        serde_json::from_str(&self.content).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}
