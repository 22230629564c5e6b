//! Error types for the findata SDK.
//!
//! A single root [`SdkError`] wraps category enums so callers can match on the
//! failure class: configuration problems surface before any request is made,
//! authentication failures come from the token endpoint, [`ApiError`] carries a
//! terminal non-2xx resource API outcome, and [`TransportError`] covers
//! network-level faults where no HTTP status exists.

mod api_error;

pub use api_error::{ApiError, ProblemDetails};

use std::time::Duration;
use thiserror::Error;

pub type SdkResult<T> = Result<T, SdkError>;

/// Root error type for the SDK.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SdkError {
    /// Check if the error came back as HTTP 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(e) if e.status == 429)
    }

    /// Check if a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Api(e) => e.status == 429,
            _ => false,
        }
    }

    /// HTTP status of the terminal outcome, if one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Malformed or incomplete settings, rejected before any request is attempted.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required setting: {field}")]
    MissingRequired { field: String },

    #[error("Invalid {kind} URL: {url}")]
    InvalidUrl {
        kind: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Token endpoint exchange or refresh returned a non-success outcome.
///
/// Never retried by the token layer itself; retry, if any, belongs to the
/// policy wrapping the outer API call.
#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Token exchange failed with status {status}: {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("Token refresh failed with status {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("Token response could not be parsed: {message}")]
    InvalidTokenResponse { message: String },
}

/// Network-level failure with no HTTP status.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request failed: {message}")]
    RequestFailed { message: String },
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ConnectionFailed { .. })
    }
}
