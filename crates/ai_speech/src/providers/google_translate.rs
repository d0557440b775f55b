//! Google Translate text-to-speech
//!
//! The endpoint only accepts short inputs, so text is split into chunks of at
//! most [`MAX_CHUNK_CHARS`] characters, preferably at punctuation or
//! whitespace. The MP3 bytes of all chunks are concatenated in order.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use domain::Language;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechSynthesizer;
use crate::types::{AudioData, AudioFormat};

/// Longest text accepted per request
pub const MAX_CHUNK_CHARS: usize = 100;

/// Synthesizer backed by the Google Translate TTS endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslateSynthesizer {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl GoogleTranslateSynthesizer {
    /// Create a synthesizer from the speech configuration
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.tts_base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Build the TTS endpoint URL
    fn tts_url(&self) -> String {
        format!("{}/translate_tts", self.base_url)
    }

    async fn fetch_chunk(&self, chunk: &str, language: Language) -> Result<Bytes, SpeechError> {
        let response = self
            .client
            .get(self.tts_url())
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.tts_code()),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Synthesis request failed");
            return Err(SpeechError::from_status(status.as_u16(), body));
        }

        response
            .bytes()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.timeout_ms))
    }
}

/// Whether a chunk may end after `c`
fn is_break(c: char) -> bool {
    c.is_whitespace() || matches!(c, '。' | '、' | '！' | '？' | '.' | ',' | '!' | '?' | ';' | ':')
}

/// Split `text` into trimmed, non-empty chunks of at most `max_chars` characters
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        let cut = if end < chars.len() {
            chars[start..end]
                .iter()
                .rposition(|&c| is_break(c))
                .map_or(end, |pos| start + pos + 1)
        } else {
            end
        };

        let chunk: String = chars[start..cut].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = cut;
    }

    chunks
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateSynthesizer {
    #[instrument(skip(self, text), fields(text_len = text.chars().count(), lang = language.tts_code()))]
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioData, SpeechError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        let mut audio = Vec::new();

        for chunk in &chunks {
            audio.extend_from_slice(&self.fetch_chunk(chunk, language).await?);
        }

        if audio.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "synthesis returned no audio".to_string(),
            ));
        }

        debug!(chunks = chunks.len(), bytes = audio.len(), "Synthesis completed");
        Ok(AudioData::new(audio, AudioFormat::Mp3))
    }

    fn name(&self) -> &str {
        "google-translate-tts"
    }
}
