//! Token lifecycle: credential caching, expiry-driven refresh and the
//! providers that hide the acquisition mechanism from the dispatcher.

mod client_credentials;
mod credential;
mod token_provider;

pub use client_credentials::{ClientCredentialsConfig, ClientCredentialsTokenProvider};
pub use credential::Credential;
pub use token_provider::{StaticTokenProvider, TokenProvider};
