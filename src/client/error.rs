//! Typed failures for calls made through [`ApiClient`](super::ApiClient).
//!
//! Error bodies are decoded once, at the HTTP boundary, so pages and effect
//! handlers match on variants instead of poking at optional response fields.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error body shape produced by the backend: `{ "errors": ["...", ...] }`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server returned {status}")]
    Status {
        status: StatusCode,
        errors: Vec<String>,
    },

    #[error("Failed to reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// How a failure should be surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// 401 from any endpoint: the session is no longer valid
    Unauthorized,
    /// The backend explained what was wrong
    Rejected(Vec<String>),
    /// Nothing structured to show
    Unknown,
}

impl ApiError {
    /// Build a status error from a raw response body
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let errors = serde_json::from_slice::<ErrorResponse>(body)
            .map(|r| r.errors)
            .unwrap_or_default();
        ApiError::Status { status, errors }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Structured messages from the error body (empty when there were none)
    pub fn errors(&self) -> &[String] {
        match self {
            ApiError::Status { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Classify the failure. Unauthorized wins over any error list.
    pub fn failure(&self) -> Failure {
        if self.is_unauthorized() {
            Failure::Unauthorized
        } else if !self.errors().is_empty() {
            Failure::Rejected(self.errors().to_vec())
        } else {
            Failure::Unknown
        }
    }
}
