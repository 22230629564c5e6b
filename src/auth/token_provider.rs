//! Token provider interface and the static-token variant.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::errors::SdkResult;

/// Produces a current, valid bearer token for the Authorization header.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_authentication_token(&self) -> SdkResult<String>;
}

/// Wraps a pre-issued personal access token. Never expires, no network calls.
pub struct StaticTokenProvider {
    token: Secret<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_authentication_token(&self) -> SdkResult<String> {
        Ok(self.token.expose_secret().clone())
    }
}
