//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use std::path::Path;

use async_trait::async_trait;
use domain::Language;

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, PcmAudio};

/// Port for remote speech recognition
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechRecognizer, PcmAudio};
///
/// async fn recognize(asr: &impl SpeechRecognizer, pcm: &PcmAudio) -> Result<String, SpeechError> {
///     asr.recognize(pcm, Language::Japanese).await
/// }
/// ```
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Turn mono 16-bit PCM into text
    ///
    /// An empty string means the service heard no words.
    async fn recognize(&self, audio: &PcmAudio, language: Language) -> Result<String, SpeechError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Port for remote speech synthesis
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Convert text to encoded speech
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioData, SpeechError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Port for file-to-file audio conversion
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Decode `input` into mono 16-bit PCM WAV at `output`
    ///
    /// Resamples to `sample_rate` when given, otherwise keeps the source rate.
    async fn decode_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: Option<u32>,
    ) -> Result<(), SpeechError>;

    /// Encode the WAV file `input` into `format` at `output`
    async fn encode(&self, input: &Path, output: &Path, format: AudioFormat) -> Result<(), SpeechError>;

    /// Codec name for logs
    fn name(&self) -> &str;
}
