//! Configuration for speech processing

use std::path::PathBuf;

use domain::Language;
use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for the speech pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Practice language used when the caller does not pick one
    #[serde(default)]
    pub language: Language,

    /// Playback speed of synthesized speech (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Base URL of the web speech recognition endpoint
    #[serde(default = "default_asr_base_url")]
    pub asr_base_url: String,

    /// Optional key for the recognition endpoint
    #[serde(default)]
    pub asr_api_key: Option<String>,

    /// Base URL of the translate TTS endpoint
    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Audio conversion backend
    #[serde(default)]
    pub codec: CodecKind,

    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// Directory for intermediate artifacts (defaults to the system temp dir)
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Format of the audio handed back to the caller
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Minimum frame RMS (16-bit scale) that can count as speech
    #[serde(default = "default_min_energy")]
    pub min_energy: f32,

    /// Text beyond this many characters is not synthesized
    #[serde(default = "default_max_synthesis_chars")]
    pub max_synthesis_chars: usize,
}

/// Audio conversion backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// External FFmpeg process, handles every format
    #[default]
    Ffmpeg,
    /// Pure-Rust WAV only
    Wav,
}

const fn default_speed() -> f32 {
    1.25
}

fn default_asr_base_url() -> String {
    "http://www.google.com/speech-api/v2".to_string()
}

fn default_tts_base_url() -> String {
    "https://translate.google.com".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_min_energy() -> f32 {
    300.0
}

const fn default_max_synthesis_chars() -> usize {
    5000
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            speed: default_speed(),
            asr_base_url: default_asr_base_url(),
            asr_api_key: None,
            tts_base_url: default_tts_base_url(),
            timeout_ms: default_timeout_ms(),
            codec: CodecKind::default(),
            ffmpeg_path: None,
            artifact_dir: None,
            output_format: default_output_format(),
            min_energy: default_min_energy(),
            max_synthesis_chars: default_max_synthesis_chars(),
        }
    }
}

impl SpeechConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_synthesis_chars == 0 {
            return Err("Max synthesis length must be greater than 0".to_string());
        }

        if self.codec == CodecKind::Wav && self.output_format != AudioFormat::Wav {
            return Err(format!(
                "The wav codec can only produce wav output, not {}",
                self.output_format
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert_eq!(config.language, Language::Japanese);
        assert!((config.speed - 1.25).abs() < f32::EPSILON);
        assert!(config.asr_api_key.is_none());
        assert_eq!(config.codec, CodecKind::Ffmpeg);
        assert_eq!(config.output_format, AudioFormat::Mp3);
        assert_eq!(config.max_synthesis_chars, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_invalid_speed() {
        let mut config = SpeechConfig::default();
        config.speed = 0.1;
        assert!(config.validate().is_err());

        config.speed = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_timeout() {
        let config = SpeechConfig {
            timeout_ms: 0,
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn wav_codec_requires_wav_output() {
        let config = SpeechConfig {
            codec: CodecKind::Wav,
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SpeechConfig {
            codec: CodecKind::Wav,
            output_format: AudioFormat::Wav,
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn codec_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CodecKind::Ffmpeg).unwrap(), "\"ffmpeg\"");
        assert_eq!(serde_json::to_string(&CodecKind::Wav).unwrap(), "\"wav\"");
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            language = "en"
            speed = 1.0
            asr_api_key = "k"
            codec = "wav"
            output_format = "wav"
            timeout_ms = 5000
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.language, Language::English);
        assert!((config.speed - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.asr_api_key.as_deref(), Some("k"));
        assert_eq!(config.codec, CodecKind::Wav);
        assert_eq!(config.output_format, AudioFormat::Wav);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.tts_base_url, "https://translate.google.com");
    }
}
