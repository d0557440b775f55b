//! Google web speech recognition
//!
//! Posts raw `audio/l16` PCM to the `speech-api/v2/recognize` endpoint. The
//! answer is newline-delimited JSON; the first line carrying a non-empty
//! transcript wins.

use std::time::Duration;

use async_trait::async_trait;
use domain::Language;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechRecognizer;
use crate::types::PcmAudio;

/// Recognizer backed by the Google web speech endpoint
#[derive(Debug, Clone)]
pub struct GoogleWebRecognizer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl GoogleWebRecognizer {
    /// Create a recognizer from the speech configuration
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.asr_base_url.trim_end_matches('/').to_string(),
            api_key: config.asr_api_key.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Build the recognize endpoint URL
    fn recognize_url(&self) -> String {
        format!("{}/recognize", self.base_url)
    }

    /// Extract the first non-empty transcript from a newline-delimited body
    fn parse_transcript(body: &str) -> Result<String, SpeechError> {
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let parsed: RecognizeResponse = serde_json::from_str(line)
                .map_err(|e| SpeechError::InvalidResponse(e.to_string()))?;

            let transcript = parsed
                .result
                .first()
                .and_then(|r| r.alternative.first())
                .map(|a| a.transcript.trim())
                .filter(|t| !t.is_empty());

            if let Some(text) = transcript {
                return Ok(text.to_string());
            }
        }
        Ok(String::new())
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<RecognizeAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognizeAlternative {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl SpeechRecognizer for GoogleWebRecognizer {
    #[instrument(skip(self, audio), fields(duration_ms = audio.duration_ms(), lang = language.asr_tag()))]
    async fn recognize(&self, audio: &PcmAudio, language: Language) -> Result<String, SpeechError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("client", "chromium"),
            ("lang", language.asr_tag()),
            ("output", "json"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let response = self
            .client
            .post(self.recognize_url())
            .query(&query)
            .header(
                CONTENT_TYPE,
                format!("audio/l16; rate={}", audio.sample_rate()),
            )
            .body(audio.to_l16_bytes())
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.timeout_ms))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Recognition request failed");
            return Err(SpeechError::from_status(status.as_u16(), body));
        }

        let transcript = Self::parse_transcript(&body)?;
        debug!(chars = transcript.chars().count(), "Recognition completed");
        Ok(transcript)
    }

    fn name(&self) -> &str {
        "google-web-speech"
    }
}
