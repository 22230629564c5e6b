//! Authenticated, resilient HTTP client core for a financial data platform
//! REST API.
//!
//! Three pieces carry the real state: the token lifecycle
//! ([`auth::ClientCredentialsTokenProvider`] caches a credential, refreshes it
//! at expiry and guarantees a single in-flight exchange across concurrent
//! callers), the retry engine ([`retry::RetryPolicy`] with per-process
//! override slots in [`retry::RetryPolicyRegistry`]), and the dispatcher
//! ([`client::ApiClient`]) that binds authentication, path encoding and retry
//! into one request execution. The per-resource APIs on top are thin.
//!
//! ```no_run
//! use findata_sdk::prelude::*;
//!
//! # async fn run() -> SdkResult<()> {
//! let configuration = ApiConfiguration::from_env()?;
//! let factory = ApiClientFactory::new(configuration)?;
//!
//! let portfolio = factory.portfolios().get_portfolio("Main", "uk-equity").await?;
//! println!("{}", portfolio.display_name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod errors;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientFactory, ApiConfiguration, BlockingApiClient};
pub use errors::{ApiError, ProblemDetails, SdkError, SdkResult};
pub use retry::{RetryPolicy, RetryPolicyRegistry};

pub mod prelude {
    pub use crate::api::{InstrumentsApi, PortfoliosApi};
    pub use crate::auth::{StaticTokenProvider, TokenProvider};
    pub use crate::client::{ApiClient, ApiClientFactory, ApiConfiguration};
    pub use crate::errors::{SdkError, SdkResult};
    pub use crate::retry::{RetryPolicy, RetryPolicyRegistry};
    pub use crate::types::RequestOptions;
}
