//! Inference errors

use domain::{DomainError, ErrorKind, ErrorRecord};
use thiserror::Error;

use crate::retry::Classify;

/// Errors that can occur while talking to the model backend
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Backend unreachable
    #[error("API error: connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the configured deadline
    #[error("API error: request timed out after {0}ms")]
    Timeout(u64),

    /// Backend reported the model as missing (HTTP 404)
    #[error("Error: 404 - {0}")]
    ModelNotFound(String),

    /// Backend internal error (HTTP 5xx)
    #[error("Error: {status} - {body}")]
    ServerError { status: u16, body: String },

    /// Any other non-success status
    #[error("Error: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body could not be decoded
    #[error("API error: invalid response: {0}")]
    InvalidResponse(String),

    /// Request parameters failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// HTTP client could not be built
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl InferenceError {
    /// Classify a transport-level failure
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::ModelNotFound(body),
            500..=599 => Self::ServerError { status, body },
            _ => Self::HttpStatus { status, body },
        }
    }

    /// Convert into the record shown to the user
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        ErrorRecord::new(self.kind(), self.to_string())
    }
}

impl Classify for InferenceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed(_) => ErrorKind::ConnectionFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ModelNotFound(_) => ErrorKind::ModelNotFound,
            Self::ServerError { .. } => ErrorKind::ServerFault,
            Self::HttpStatus { .. } => ErrorKind::HttpError,
            Self::InvalidResponse(_) => ErrorKind::MalformedResponse,
            Self::InvalidRequest(_) | Self::Configuration(_) => ErrorKind::InvalidRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            InferenceError::from_status(404, "model 'x' not found".into()).kind(),
            ErrorKind::ModelNotFound
        );
        assert_eq!(
            InferenceError::from_status(500, String::new()).kind(),
            ErrorKind::ServerFault
        );
        assert_eq!(
            InferenceError::from_status(503, String::new()).kind(),
            ErrorKind::ServerFault
        );
        assert_eq!(
            InferenceError::from_status(400, String::new()).kind(),
            ErrorKind::HttpError
        );
        assert_eq!(
            InferenceError::from_status(429, String::new()).kind(),
            ErrorKind::HttpError
        );
    }

    #[test]
    fn http_errors_render_status_and_body() {
        let err = InferenceError::from_status(500, "boom".into());
        assert_eq!(err.to_string(), "Error: 500 - boom");
    }

    #[test]
    fn record_carries_kind_and_retryability() {
        let record = InferenceError::Timeout(60_000).into_record();
        assert_eq!(record.kind, ErrorKind::Timeout);
        assert!(record.retryable);
        assert!(record.message.contains("60000ms"));

        let record = InferenceError::ModelNotFound("missing".into()).into_record();
        assert_eq!(record.kind, ErrorKind::ModelNotFound);
        assert!(!record.retryable);
    }

    #[test]
    fn validation_errors_are_invalid_requests() {
        let err: InferenceError = DomainError::InvalidMaxTokens(0).into();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
