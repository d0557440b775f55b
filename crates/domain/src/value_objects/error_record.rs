//! Classified error records
//!
//! Every failure that crosses the turn pipeline boundary is represented as an
//! [`ErrorRecord`] value instead of a propagated fault, so the front end can show
//! it to the user verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Backend unreachable (refused, reset, DNS)
    ConnectionFailure,
    /// No response within the deadline
    Timeout,
    /// Backend reports the requested model is missing
    ModelNotFound,
    /// Backend internal error (5xx)
    ServerFault,
    /// Any other non-success HTTP status
    HttpError,
    /// Payload could not be decoded
    MalformedResponse,
    /// Request parameters rejected before any network call
    InvalidRequest,
    /// Speech recognition could not make sense of the audio
    SpeechUnintelligible,
    /// Speech provider quota or rate limit hit
    SpeechQuotaExceeded,
    /// Speech provider unreachable
    SpeechNetwork,
    /// Speech provider returned an error
    SpeechServiceError,
    /// Synthesis failed at some stage
    SynthesisFailure,
}

impl ErrorKind {
    /// Whether failures of this kind are transient by nature
    ///
    /// This is a property of the failure class; which kinds an operation actually
    /// retries is decided by its retry policy.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailure | Self::Timeout | Self::SpeechNetwork
        )
    }

    /// Fixed user-facing message for speech failures
    ///
    /// Returns `None` for backend kinds, whose messages carry request details.
    #[must_use]
    pub const fn speech_message(&self) -> Option<&'static str> {
        match self {
            Self::SpeechUnintelligible => Some(
                "Sorry, I could not understand the audio. Please speak a little more clearly and try again.",
            ),
            Self::SpeechQuotaExceeded => Some(
                "The speech recognition service is temporarily over its quota. Please type your message or try again later.",
            ),
            Self::SpeechNetwork => Some(
                "Could not reach the speech recognition service. Please check your network connection.",
            ),
            Self::SpeechServiceError => Some(
                "The speech recognition service returned an error. Please try again.",
            ),
            _ => None,
        }
    }

    /// Stable snake_case label for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionFailure => "connection_failure",
            Self::Timeout => "timeout",
            Self::ModelNotFound => "model_not_found",
            Self::ServerFault => "server_fault",
            Self::HttpError => "http_error",
            Self::MalformedResponse => "malformed_response",
            Self::InvalidRequest => "invalid_request",
            Self::SpeechUnintelligible => "speech_unintelligible",
            Self::SpeechQuotaExceeded => "speech_quota_exceeded",
            Self::SpeechNetwork => "speech_network",
            Self::SpeechServiceError => "speech_service_error",
            Self::SynthesisFailure => "synthesis_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, user-presentable failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Failure class
    pub kind: ErrorKind,
    /// Human-readable message, shown to the user as-is
    pub message: String,
    /// Whether a retry could succeed
    pub retryable: bool,
}

impl ErrorRecord {
    /// Create a record whose retryable flag follows the kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: kind.is_transient(),
        }
    }

    /// Create a speech record carrying the fixed message for its kind
    #[must_use]
    pub fn speech(kind: ErrorKind) -> Self {
        let message = kind
            .speech_message()
            .unwrap_or("Speech processing failed.");
        Self::new(kind, message)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
