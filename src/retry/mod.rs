//! Retry policy engine and process-wide policy registry.
//!
//! Two retry reasons are recognized: rate limiting (HTTP 429, independently
//! budgeted and overridable per call) and general transient failure (a
//! configurable status set plus retryable transport faults, fixed budget).
//! Policies are plain data resolved per request from the [`RetryPolicyRegistry`].

mod policy;
mod registry;

pub use policy::{
    RetryPolicy, DEFAULT_RATE_LIMIT_RETRIES, DEFAULT_TRANSIENT_RETRIES, HTTP_TOO_MANY_REQUESTS,
};
pub use registry::{PolicyFactory, RetryPolicyRegistry};
