//! Per-session turn settings

use application::{TurnInput, TurnRequest};
use domain::{GenerationParams, Language};
use infrastructure::AppConfig;

/// Everything the REPL lets the user change between turns
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Model used for the next turn
    pub model: String,
    /// Prepend the teacher prompt
    pub teacher_mode: bool,
    /// Practice language
    pub language: Language,
    /// Playback speed of synthesized replies
    pub speed: f32,
    /// Temperature and token limit
    pub params: GenerationParams,
}

impl SessionSettings {
    /// Start from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured generation defaults are out of range.
    pub fn from_config(config: &AppConfig) -> Result<Self, domain::DomainError> {
        Ok(Self {
            model: config.inference.model.clone(),
            teacher_mode: true,
            language: config.speech.language,
            speed: config.speech.speed,
            params: GenerationParams::new(
                config.inference.temperature,
                config.inference.max_tokens,
            )?,
        })
    }

    /// Build a turn request for the given input
    #[must_use]
    pub fn request(&self, input: TurnInput) -> TurnRequest {
        TurnRequest {
            input,
            model: self.model.clone(),
            temperature: self.params.temperature(),
            max_tokens: self.params.max_tokens(),
            teacher_mode: self.teacher_mode,
            language: self.language,
            speech_speed: self.speed,
        }
    }

    /// Change the speed, keeping the old value on error
    ///
    /// # Errors
    ///
    /// Returns a message if the speed is out of range.
    pub fn set_speed(&mut self, speed: f32) -> Result<(), String> {
        self.speed = TurnRequest::validate_speed(speed).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Change the temperature, keeping the old value on error
    ///
    /// # Errors
    ///
    /// Returns a message if the temperature is out of range.
    pub fn set_temperature(&mut self, temperature: f32) -> Result<(), String> {
        self.params = GenerationParams::new(temperature, self.params.max_tokens())
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Change the token limit, keeping the old value on error
    ///
    /// # Errors
    ///
    /// Returns a message if the limit is out of range.
    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<(), String> {
        self.params = GenerationParams::new(self.params.temperature(), max_tokens)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// One-line summary for the banner
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "model={} lang={} teacher={} speed={} temperature={} max_tokens={}",
            self.model,
            self.language,
            if self.teacher_mode { "on" } else { "off" },
            self.speed,
            self.params.temperature(),
            self.params.max_tokens(),
        )
    }
}
