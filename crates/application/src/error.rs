//! Application-level errors

use domain::{DomainError, ErrorKind, ErrorRecord};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Turn parameter outside its allowed range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Classification shown to the user
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRequest
    }

    /// Convert into an in-band record
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        ErrorRecord::new(self.kind(), self.to_string())
    }
}
