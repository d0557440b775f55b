//! Application configuration
//!
//! Layered in this order, later sources winning:
//! - per-field `serde` defaults
//! - an optional `config.toml` (or an explicit file)
//! - environment variables such as `SPEAKL2_INFERENCE__MODEL`
//!
//! Sections:
//! - `inference`: Ollama backend and retry bounds
//! - `speech`: recognition, synthesis and audio conversion
//! - `telemetry`: log filter and output format

mod inference;
mod telemetry;

use std::{collections::HashMap, path::Path};

use ai_speech::SpeechConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use inference::InferenceAppConfig;
pub use telemetry::TelemetryAppConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SPEAKL2";

/// Errors from configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are out of range
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model backend
    #[serde(default)]
    pub inference: InferenceAppConfig,

    /// Speech pipeline
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load from `config.toml` in the working directory (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit configuration file
    ///
    /// An explicit file must exist; the implicit `config.toml` is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is missing or malformed, or a value is out of range.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(file, None)
    }

    fn build(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let loaded: Self = config::Config::builder()
            .add_source(file_source)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        debug!(
            model = %loaded.inference.model,
            base_url = %loaded.inference.base_url,
            language = %loaded.speech.language,
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Check every range constraint, reporting all violations at once
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing each out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = self.inference.violations();
        if let Err(message) = self.speech.validate() {
            violations.push(format!("speech: {message}"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(violations))
        }
    }
}
