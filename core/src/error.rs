//! Error types for the pessoa API client.
//!
//! # Design
//! Two layers. `ApiError` is what the HTTP wrapper produces and keeps the
//! structured detail (status code, raw body) for diagnostics. `DomainError`
//! is what the person service hands to its callers: text only. The status
//! code does not survive the service boundary.

use std::fmt;

use thiserror::Error;

/// Errors produced by `ApiClient` verb calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request was dispatched but no response came back (connection
    /// refused, DNS failure, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived with a non-2xx status.
    #[error("request failed with status code {status}")]
    Status { status: u16, body: String },

    /// The request could not be built or dispatched (bad URL, body that
    /// fails to serialize).
    #[error("invalid request: {0}")]
    Request(String),

    /// A 2xx response body could not be deserialized into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Status code of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message-only error raised by the person service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DomainError {
    message: String,
}

impl DomainError {
    /// Discard `cause` and keep only `prefix` followed by its message.
    pub fn wrap(prefix: &str, cause: impl fmt::Display) -> Self {
        Self {
            message: format!("{prefix}{cause}"),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_omits_body() {
        let err = ApiError::Status {
            status: 404,
            body: "{\"detail\":\"missing\"}".to_string(),
        };
        assert_eq!(err.to_string(), "request failed with status code 404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn domain_error_concatenates_prefix_and_cause() {
        let cause = ApiError::Network("connection refused".to_string());
        let err = DomainError::wrap("failed to list people: ", &cause);
        assert_eq!(err.message(), "failed to list people: network error: connection refused");
        assert_eq!(err.to_string(), err.message());
    }
}
