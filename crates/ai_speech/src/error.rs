//! Speech processing errors

use domain::{ErrorKind, ErrorRecord};
use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout while waiting for the speech service
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Provider quota or rate limit hit
    #[error("Rate limit exceeded (status {0})")]
    RateLimited(u16),

    /// Speech service answered with an error status
    #[error("Request failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },

    /// Speech service answered with something unreadable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Input file missing, unreadable or not audio
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Audio processing/conversion failed
    #[error("Audio processing failed: {0}")]
    AudioProcessing(String),

    /// Audio holds nothing above the calibrated energy threshold, or the
    /// recognizer found no words
    #[error("No speech detected")]
    NoSpeech,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local file operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    /// Classify a transport-level failure
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() || err.is_request() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            403 | 429 => Self::RateLimited(status),
            _ => Self::RequestFailed { status, body },
        }
    }

    /// Classification shown to the user
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAudio(_) | Self::NoSpeech => ErrorKind::SpeechUnintelligible,
            Self::RateLimited(_) => ErrorKind::SpeechQuotaExceeded,
            Self::ConnectionFailed(_) | Self::Timeout(_) => ErrorKind::SpeechNetwork,
            Self::RequestFailed { .. }
            | Self::InvalidResponse(_)
            | Self::AudioProcessing(_)
            | Self::Configuration(_)
            | Self::Io(_) => ErrorKind::SpeechServiceError,
        }
    }

    /// Convert into the fixed user-facing record for this failure class
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        ErrorRecord::speech(self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_statuses_are_rate_limits() {
        assert_eq!(
            SpeechError::from_status(429, String::new()).kind(),
            ErrorKind::SpeechQuotaExceeded
        );
        assert_eq!(
            SpeechError::from_status(403, String::new()).kind(),
            ErrorKind::SpeechQuotaExceeded
        );
        assert_eq!(
            SpeechError::from_status(500, String::new()).kind(),
            ErrorKind::SpeechServiceError
        );
    }

    #[test]
    fn audio_problems_are_unintelligible() {
        assert_eq!(SpeechError::NoSpeech.kind(), ErrorKind::SpeechUnintelligible);
        assert_eq!(
            SpeechError::InvalidAudio("x".into()).kind(),
            ErrorKind::SpeechUnintelligible
        );
    }

    #[test]
    fn local_tooling_faults_are_service_errors() {
        assert_eq!(
            SpeechError::AudioProcessing("Failed to spawn FFmpeg".into()).kind(),
            ErrorKind::SpeechServiceError
        );
        assert_ne!(
            SpeechError::AudioProcessing("Audio task failed".into())
                .into_record()
                .message,
            ErrorKind::SpeechUnintelligible.speech_message().unwrap()
        );
    }

    #[test]
    fn network_problems_are_network_errors() {
        assert_eq!(SpeechError::Timeout(100).kind(), ErrorKind::SpeechNetwork);
        assert_eq!(
            SpeechError::ConnectionFailed("refused".into()).kind(),
            ErrorKind::SpeechNetwork
        );
    }

    #[test]
    fn record_uses_fixed_message() {
        let record = SpeechError::RateLimited(429).into_record();
        assert_eq!(record.kind, ErrorKind::SpeechQuotaExceeded);
        assert_eq!(
            record.message,
            ErrorKind::SpeechQuotaExceeded.speech_message().unwrap()
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            SpeechError::Timeout(30000).to_string(),
            "Speech processing timeout after 30000ms"
        );
        assert_eq!(
            SpeechError::InvalidAudio("corrupt header".into()).to_string(),
            "Invalid audio: corrupt header"
        );
        assert_eq!(SpeechError::NoSpeech.to_string(), "No speech detected");
    }
}
