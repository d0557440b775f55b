//! Adapters - Implementations of application ports
//!
//! Each adapter wraps an engine from `ai_core` or `ai_speech` and exposes it
//! through the port the orchestrator depends on.

mod ollama_model_adapter;
mod speech_adapter;

pub use ollama_model_adapter::OllamaModelAdapter;
pub use speech_adapter::SpeechPipelineAdapter;
