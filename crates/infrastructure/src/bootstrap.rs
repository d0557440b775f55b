//! Wiring of adapters into the orchestrator

use std::sync::Arc;

use application::{ChatOrchestrator, error::ApplicationError};
use tracing::info;

use crate::{
    adapters::{OllamaModelAdapter, SpeechPipelineAdapter},
    config::AppConfig,
};

/// Build an orchestrator backed by Ollama and the web speech pipeline
///
/// # Errors
///
/// Returns an error if either adapter rejects its configuration.
pub fn build_orchestrator(config: &AppConfig) -> Result<ChatOrchestrator, ApplicationError> {
    let model = OllamaModelAdapter::new(config.inference.to_inference_config())?;
    let speech = SpeechPipelineAdapter::new(config.speech.clone())?;

    info!(
        base_url = %config.inference.base_url,
        codec = ?config.speech.codec,
        "Orchestrator assembled"
    );
    Ok(ChatOrchestrator::new(Arc::new(model), Arc::new(speech)))
}
