//! Ollama model adapter - Implements ModelPort using ai_core

use std::sync::Arc;

use ai_core::{InferenceConfig, ModelClient, OllamaClient};
use application::{error::ApplicationError, ports::ModelPort};
use async_trait::async_trait;
use domain::{ChatRequest, ModelResponse};
use tracing::{debug, instrument};

/// Adapter for Ollama-compatible chat backends
pub struct OllamaModelAdapter {
    client: Arc<dyn ModelClient>,
}

impl std::fmt::Debug for OllamaModelAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaModelAdapter")
            .field("default_model", &self.client.default_model())
            .finish()
    }
}

impl OllamaModelAdapter {
    /// Create an adapter talking to the configured backend
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let client = OllamaClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn from_client(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelPort for OllamaModelAdapter {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat(&self, request: &ChatRequest) -> ModelResponse {
        let response = self.client.chat(request).await;
        if let ModelResponse::Error(record) = &response {
            debug!(kind = %record.kind, "Model returned an error record");
        }
        response
    }

    async fn list_models(&self) -> Vec<String> {
        self.client.list_models().await
    }

    async fn is_healthy(&self) -> bool {
        self.client.health_check().await
    }

    fn default_model(&self) -> String {
        self.client.default_model().to_string()
    }
}
