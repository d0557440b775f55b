//! Speech adapter - Implements SpeechPort using ai_speech

use std::{path::Path, sync::Arc};

use ai_speech::{SpeechConfig, SpeechPipeline};
use application::{error::ApplicationError, ports::SpeechPort};
use async_trait::async_trait;
use domain::{AudioArtifact, ErrorRecord, Language};

/// Adapter exposing the speech pipeline to the orchestrator
#[derive(Clone)]
pub struct SpeechPipelineAdapter {
    pipeline: Arc<SpeechPipeline>,
}

impl std::fmt::Debug for SpeechPipelineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechPipelineAdapter")
            .field("artifact_dir", &self.pipeline.artifacts().dir())
            .finish()
    }
}

impl SpeechPipelineAdapter {
    /// Build the pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a provider cannot be built.
    pub fn new(config: SpeechConfig) -> Result<Self, ApplicationError> {
        let pipeline = SpeechPipeline::from_config(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::from_pipeline(pipeline))
    }

    /// Wrap an already assembled pipeline
    #[must_use]
    pub fn from_pipeline(pipeline: SpeechPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// The wrapped pipeline
    #[must_use]
    pub fn pipeline(&self) -> &SpeechPipeline {
        &self.pipeline
    }
}

#[async_trait]
impl SpeechPort for SpeechPipelineAdapter {
    async fn transcribe(&self, audio_file: &Path, language: Language) -> Result<String, ErrorRecord> {
        self.pipeline.transcribe(audio_file, language).await
    }

    async fn synthesize(&self, text: &str, language: Language, speed: f32) -> Option<AudioArtifact> {
        self.pipeline.synthesize(text, language, speed).await
    }
}
