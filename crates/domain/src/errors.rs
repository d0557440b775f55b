//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Sampling temperature outside the accepted range
    #[error("Invalid temperature: {0} (expected 0.0 to 2.0)")]
    InvalidTemperature(String),

    /// Token budget outside the accepted range
    #[error("Invalid max tokens: {0} (expected 1 to 8192)")]
    InvalidMaxTokens(u32),

    /// Unsupported practice language
    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_temperature_error_message() {
        let err = DomainError::InvalidTemperature("2.5".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid temperature: 2.5 (expected 0.0 to 2.0)"
        );
    }

    #[test]
    fn invalid_max_tokens_error_message() {
        let err = DomainError::InvalidMaxTokens(0);
        assert_eq!(err.to_string(), "Invalid max tokens: 0 (expected 1 to 8192)");
    }

    #[test]
    fn unknown_language_error_message() {
        let err = DomainError::UnknownLanguage("klingon".to_string());
        assert_eq!(err.to_string(), "Unsupported language: klingon");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("speed must be positive".to_string());
        assert_eq!(err.to_string(), "Validation failed: speed must be positive");
    }
}
