//! Speech pipeline
//!
//! Ties the recognizer, synthesizer and codec together. Every intermediate
//! file lives in a [`ScopedArtifact`](crate::artifact::ScopedArtifact) and is
//! gone by the time a call returns; only the final synthesized artifact is
//! handed to the caller.
//!
//! Failures never escape as faults: transcription yields an [`ErrorRecord`]
//! carrying a fixed guidance message, synthesis degrades to `None`.

use std::path::Path;
use std::sync::Arc;

use domain::{ErrorKind, ErrorRecord, Language};
use tracing::{debug, info, instrument, warn};

use crate::artifact::TempResourceManager;
use crate::calibration::EnergyCalibration;
use crate::codec::{codec_for, read_pcm, rescale_rate};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{AudioCodec, SpeechRecognizer, SpeechSynthesizer};
use crate::providers::{GoogleTranslateSynthesizer, GoogleWebRecognizer};
use crate::types::{AudioArtifact, AudioFormat, PcmAudio};

/// Sample rate recognition input is normalized to
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;

/// Transcription and synthesis with scoped intermediates
#[derive(Clone)]
pub struct SpeechPipeline {
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    codec: Arc<dyn AudioCodec>,
    artifacts: TempResourceManager,
    calibration: EnergyCalibration,
    config: SpeechConfig,
}

impl std::fmt::Debug for SpeechPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechPipeline")
            .field("recognizer", &self.recognizer.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("codec", &self.codec.name())
            .field("artifact_dir", &self.artifacts.dir())
            .finish_non_exhaustive()
    }
}

impl SpeechPipeline {
    /// Assemble a pipeline from explicit collaborators
    #[must_use]
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        codec: Arc<dyn AudioCodec>,
        artifacts: TempResourceManager,
        config: SpeechConfig,
    ) -> Self {
        Self {
            recognizer,
            synthesizer,
            codec,
            artifacts,
            calibration: EnergyCalibration::new(config.min_energy),
            config,
        }
    }

    /// Build the default Google-backed pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an HTTP client
    /// cannot be created.
    pub fn from_config(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let recognizer = Arc::new(GoogleWebRecognizer::new(&config)?);
        let synthesizer = Arc::new(GoogleTranslateSynthesizer::new(&config)?);
        let codec = codec_for(config.codec, config.ffmpeg_path.as_deref());
        let artifacts = TempResourceManager::new(config.artifact_dir.clone());

        Ok(Self::new(recognizer, synthesizer, codec, artifacts, config))
    }

    /// The pipeline configuration
    #[must_use]
    pub const fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// The artifact manager intermediates are created with
    #[must_use]
    pub const fn artifacts(&self) -> &TempResourceManager {
        &self.artifacts
    }

    /// Transcribe an audio file
    ///
    /// # Errors
    ///
    /// Returns a speech [`ErrorRecord`] whose message is the user-facing
    /// guidance for the failure class.
    #[instrument(skip(self), fields(path = %audio_file.display(), lang = language.asr_tag()))]
    pub async fn transcribe(
        &self,
        audio_file: &Path,
        language: Language,
    ) -> Result<String, ErrorRecord> {
        match self.try_transcribe(audio_file, language).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "Transcription completed");
                Ok(text)
            },
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Transcription failed");
                Err(e.into_record())
            },
        }
    }

    async fn try_transcribe(&self, input: &Path, language: Language) -> Result<String, SpeechError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(SpeechError::InvalidAudio(format!(
                "file not found: {}",
                input.display()
            )));
        }
        let Some(format) = AudioFormat::from_path(input) else {
            return Err(SpeechError::InvalidAudio(format!(
                "unsupported audio format: {}",
                input.display()
            )));
        };
        debug!(%format, "Normalizing input");

        let mut normalized = self.artifacts.acquire(AudioFormat::Wav)?;
        self.codec
            .decode_to_wav(input, normalized.path(), Some(RECOGNITION_SAMPLE_RATE))
            .await?;
        normalized.mark_in_use();

        let pcm = load_pcm(normalized.path()).await?;
        drop(normalized);

        let assessment = self.calibration.assess(&pcm);
        debug!(
            noise_floor = assessment.noise_floor,
            threshold = assessment.threshold,
            peak = assessment.peak,
            "Calibrated ambient noise"
        );
        if !assessment.has_speech() {
            return Err(SpeechError::NoSpeech);
        }

        let text = self.recognizer.recognize(&pcm, language).await?;
        if text.trim().is_empty() {
            return Err(SpeechError::NoSpeech);
        }
        Ok(text)
    }

    /// Synthesize `text` at `speed`
    ///
    /// Returns `None` for empty text or when any stage fails. The returned
    /// artifact is owned by the caller.
    #[instrument(skip(self, text), fields(text_len = text.chars().count(), lang = language.tts_code()))]
    pub async fn synthesize(&self, text: &str, language: Language, speed: f32) -> Option<AudioArtifact> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Nothing to synthesize");
            return None;
        }

        let cap = self.config.max_synthesis_chars;
        let text: String = if text.chars().count() > cap {
            info!(cap, "Truncating text before synthesis");
            text.chars().take(cap).collect()
        } else {
            text.to_string()
        };

        match self.try_synthesize(&text, language, speed).await {
            Ok(artifact) => {
                info!(path = %artifact.path().display(), "Synthesis completed");
                Some(artifact)
            },
            Err(e) => {
                warn!(
                    error = %e,
                    kind = %ErrorKind::SynthesisFailure,
                    "Synthesis failed, continuing without audio"
                );
                None
            },
        }
    }

    async fn try_synthesize(
        &self,
        text: &str,
        language: Language,
        speed: f32,
    ) -> Result<AudioArtifact, SpeechError> {
        let audio = self.synthesizer.synthesize(text, language).await?;

        let mut encoded = self.artifacts.acquire(audio.format())?;
        tokio::fs::write(encoded.path(), audio.data()).await?;
        encoded.mark_in_use();

        let mut decoded = self.artifacts.acquire(AudioFormat::Wav)?;
        self.codec
            .decode_to_wav(encoded.path(), decoded.path(), None)
            .await?;
        decoded.mark_in_use();
        drop(encoded);

        let scaled = if (speed - 1.0).abs() > f32::EPSILON {
            let mut scaled = self.artifacts.acquire(AudioFormat::Wav)?;
            let (input, output) = (decoded.path().to_path_buf(), scaled.path().to_path_buf());
            tokio::task::spawn_blocking(move || rescale_rate(&input, &output, speed))
                .await
                .map_err(|e| SpeechError::AudioProcessing(format!("Audio task failed: {e}")))??;
            scaled.mark_in_use();
            drop(decoded);
            scaled
        } else {
            decoded
        };

        let mut output = self.artifacts.acquire(self.config.output_format)?;
        self.codec
            .encode(scaled.path(), output.path(), self.config.output_format)
            .await?;
        output.mark_in_use();

        Ok(output.persist())
    }
}

async fn load_pcm(path: &Path) -> Result<PcmAudio, SpeechError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_pcm(&path))
        .await
        .map_err(|e| SpeechError::AudioProcessing(format!("Audio task failed: {e}")))?
}
