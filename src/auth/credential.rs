//! Cached bearer credential.

use chrono::{DateTime, Utc};

/// Bearer token material held by a token provider.
///
/// Expiry is an absolute instant computed at issuance, so validity is
/// re-evaluated at the moment of each call rather than tracked by a timer.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_on: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_on: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_on,
        }
    }

    /// Whether the access token is still usable at `now`. A credential
    /// without an expiry never goes stale.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_on {
            Some(expires_on) => now < expires_on,
            None => true,
        }
    }
}
