//! Sampling parameters value object

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Accepted sampling temperature range
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Accepted generation token budget range
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1..=8192;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default generation token budget
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Validated temperature / max-tokens pair
///
/// Construction is the only validation point; a value of this type is always
/// within [`TEMPERATURE_RANGE`] and [`MAX_TOKENS_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGenerationParams")]
pub struct GenerationParams {
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct RawGenerationParams {
    temperature: f32,
    max_tokens: u32,
}

impl TryFrom<RawGenerationParams> for GenerationParams {
    type Error = DomainError;

    fn try_from(raw: RawGenerationParams) -> Result<Self, Self::Error> {
        Self::new(raw.temperature, raw.max_tokens)
    }
}

impl GenerationParams {
    /// Validate and create a parameter pair
    pub fn new(temperature: f32, max_tokens: u32) -> Result<Self, DomainError> {
        // NaN fails `contains`, so it is rejected here too
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(DomainError::InvalidTemperature(temperature.to_string()));
        }
        if !MAX_TOKENS_RANGE.contains(&max_tokens) {
            return Err(DomainError::InvalidMaxTokens(max_tokens));
        }
        Ok(Self {
            temperature,
            max_tokens,
        })
    }

    /// Sampling temperature
    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Maximum tokens to generate
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
