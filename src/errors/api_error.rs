//! Terminal API failure and the problem-details document embedded in it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Non-2xx terminal outcome from the resource API, after any retries.
///
/// Carries the raw status, headers and body of the last attempt. Extraction of
/// a structured [`ProblemDetails`] document is best-effort and never fails:
/// malformed or absent content simply yields `None`.
#[derive(Error, Debug, Clone)]
#[error("status {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub error_content: Option<String>,
    pub headers: HashMap<String, String>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_content: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_error_content(mut self, content: impl Into<String>) -> Self {
        self.error_content = Some(content.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Parse the error body as a problem-details document.
    ///
    /// Returns `None` on absent or empty content, or when the body is not a
    /// JSON object of the expected shape.
    pub fn problem_details(&self) -> Option<ProblemDetails> {
        let content = self.error_content.as_deref()?;
        if content.is_empty() {
            return None;
        }
        serde_json::from_str(content).ok()
    }

    /// Request identifier recorded by the platform for this failure, if the
    /// error body carries one.
    pub fn request_id(&self) -> Option<String> {
        self.problem_details()?.request_id()
    }
}

/// Structured error-description document returned by the platform in HTTP
/// error bodies. Unrecognized fields are preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Machine-readable error name. Always present in well-formed documents;
    /// a body without one is treated as unparseable.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Link to the platform's log entry for the failing request. The request
    /// id is its trailing path segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ProblemDetails {
    pub fn request_id(&self) -> Option<String> {
        let instance = self.instance.as_deref()?;
        let id = instance.rsplit('/').next()?;
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}
