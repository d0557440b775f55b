//! Model backend configuration section

use ai_core::{InferenceConfig, RetryPolicy};
use domain::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};

/// `[inference]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceAppConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to start the session with
    #[serde(default = "default_model")]
    pub model: String,

    /// Default sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default maximum tokens to generate (1 to 8192)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds (1 to 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total calls per request, retries included (0 to 10, 0 behaves as 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lower backoff bound in milliseconds
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,

    /// Upper backoff bound in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma3".to_string()
}

const fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

const fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_min_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for InferenceAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl InferenceAppConfig {
    /// Convert to the client configuration
    #[must_use]
    pub fn to_inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            base_url: self.base_url.clone(),
            default_model: self.model.clone(),
            timeout_ms: self.timeout_secs.saturating_mul(1_000),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                min_backoff_ms: self.min_backoff_ms,
                max_backoff_ms: self.max_backoff_ms,
                ..RetryPolicy::default()
            },
        }
    }

    pub(super) fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            violations.push(format!(
                "inference.base_url must be an http(s) URL, got {:?}",
                self.base_url
            ));
        }
        if self.model.trim().is_empty() {
            violations.push("inference.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            violations.push(format!(
                "inference.temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if !(1..=8192).contains(&self.max_tokens) {
            violations.push(format!(
                "inference.max_tokens must be between 1 and 8192, got {}",
                self.max_tokens
            ));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            violations.push(format!(
                "inference.timeout_secs must be between 1 and 300, got {}",
                self.timeout_secs
            ));
        }
        if self.max_attempts > 10 {
            violations.push(format!(
                "inference.max_attempts must be between 0 and 10, got {}",
                self.max_attempts
            ));
        }
        if self.min_backoff_ms > self.max_backoff_ms {
            violations.push(format!(
                "inference.min_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.min_backoff_ms, self.max_backoff_ms
            ));
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_defaults() {
        let config = InferenceAppConfig::default().to_inference_config();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.default_model, "gemma3");
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn retry_bounds_flow_into_policy() {
        let section = InferenceAppConfig {
            max_attempts: 5,
            min_backoff_ms: 10,
            max_backoff_ms: 20,
            ..Default::default()
        };
        let policy = section.to_inference_config().retry;
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.min_backoff_ms, 10);
        assert_eq!(policy.max_backoff_ms, 20);
    }

    #[test]
    fn zero_attempts_is_valid() {
        let section = InferenceAppConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(section.violations().is_empty());
        assert_eq!(section.to_inference_config().retry.attempts(), 1);
    }
}
