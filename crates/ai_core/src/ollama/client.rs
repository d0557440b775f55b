//! Ollama client implementation

use std::time::Duration;

use async_trait::async_trait;
use domain::{ChatRequest, ErrorKind, GenerationParams, ModelRequest, ModelResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::ModelClient;
use crate::prompts::teacher_prompt;
use crate::retry::with_retry;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for an Ollama-compatible server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: InferenceConfig,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::Configuration(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            max_attempts = config.retry.attempts(),
            "Initialized Ollama client"
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, InferenceError> {
        Self::new(InferenceConfig::default())
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Validate parameters and assemble the message list
    ///
    /// Runs before any network traffic, so invalid parameters never reach
    /// the backend.
    pub fn build_request(&self, request: &ChatRequest) -> Result<ModelRequest, InferenceError> {
        let params = GenerationParams::new(request.temperature, request.max_tokens)?;

        let model = if request.model.trim().is_empty() {
            self.config.default_model.as_str()
        } else {
            request.model.as_str()
        };

        let system_prompt = request.teacher_mode.then(|| teacher_prompt(request.language));

        Ok(ModelRequest::assemble(
            model,
            system_prompt.as_deref(),
            &request.history,
            request.message.as_str(),
            params,
        ))
    }

    /// One POST to `/api/chat`
    async fn send_chat(&self, body: &OllamaChatRequest<'_>) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(self.api_url("chat"))
            .json(body)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Chat request failed");
            return Err(InferenceError::from_status(status.as_u16(), text));
        }

        let parsed: OllamaChatResponse = serde_json::from_str(&text)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(parsed.message.content)
    }

    /// One GET to `/api/tags`
    async fn fetch_tags(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .client
            .get(self.api_url("tags"))
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::from_status(status.as_u16(), String::new()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let parsed: OllamaModelsResponse = serde_json::from_str(&text)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let mut names: Vec<String> = Vec::with_capacity(parsed.models.len());
        for model in parsed.models {
            if !names.contains(&model.name) {
                names.push(model.name);
            }
        }
        Ok(names)
    }
}

/// Ollama-format chat request
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

impl<'a> From<&'a ModelRequest> for OllamaChatRequest<'a> {
    fn from(request: &'a ModelRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: request.params.temperature(),
                num_predict: request.params.max_tokens(),
            },
        }
    }
}

/// Ollama-format chat response
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct OllamaModelsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[async_trait]
impl ModelClient for OllamaClient {
    #[instrument(skip(self, request), fields(model = %request.model, teacher_mode = request.teacher_mode))]
    async fn chat(&self, request: &ChatRequest) -> ModelResponse {
        let model_request = match self.build_request(request) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Rejected chat request before sending");
                return ModelResponse::Error(e.into_record());
            },
        };

        let body = OllamaChatRequest::from(&model_request);
        debug!(messages = body.messages.len(), "Sending chat request");

        let outcome = with_retry(&self.config.retry, || self.send_chat(&body)).await;

        match outcome.result {
            Ok(content) => {
                debug!(
                    attempts = outcome.attempts,
                    chars = content.chars().count(),
                    "Chat completed"
                );
                ModelResponse::Content(content)
            },
            Err(e) => {
                warn!(attempts = outcome.attempts, error = %e, "Chat failed");
                ModelResponse::Error(e.into_record())
            },
        }
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Vec<String> {
        let policy = self.config.retry.clone().retrying(ErrorKind::MalformedResponse);
        let outcome = with_retry(&policy, || self.fetch_tags()).await;

        match outcome.result {
            Ok(models) => models,
            Err(e) => {
                warn!(attempts = outcome.attempts, error = %e, "Listing models failed");
                Vec::new()
            },
        }
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> bool {
        let response = self
            .client
            .get(self.api_url("tags"))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            },
        }
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ConversationHistory, ConversationTurn, Language, MessageRole};

    fn client() -> OllamaClient {
        OllamaClient::with_defaults().unwrap()
    }

    #[test]
    fn api_urls() {
        let client = OllamaClient::new(InferenceConfig::with_base_url("http://host:1/")).unwrap();
        assert_eq!(client.api_url("chat"), "http://host:1/api/chat");
        assert_eq!(client.api_url("/tags"), "http://host:1/api/tags");
    }

    #[test]
    fn default_model_is_gemma() {
        assert_eq!(client().default_model(), "gemma3");
    }

    #[test]
    fn teacher_mode_prepends_system_prompt() {
        let request = ChatRequest::new("m", "hi").with_teacher_mode(Language::Japanese);
        let built = client().build_request(&request).unwrap();
        assert_eq!(built.messages[0].role, MessageRole::System);
        assert_eq!(built.system_prompt(), Some(teacher_prompt(Language::Japanese).as_str()));
    }

    #[test]
    fn plain_mode_has_no_system_prompt() {
        let history: ConversationHistory =
            vec![ConversationTurn::new("a", "b")].into_iter().collect();
        let request = ChatRequest::new("m", "hi").with_history(history);
        let built = client().build_request(&request).unwrap();
        assert!(built.system_prompt().is_none());
        assert_eq!(built.messages.len(), 3);
    }

    #[test]
    fn empty_model_falls_back_to_default() {
        let built = client().build_request(&ChatRequest::new("  ", "hi")).unwrap();
        assert_eq!(built.model, "gemma3");
    }

    #[test]
    fn out_of_range_params_fail_validation() {
        let request = ChatRequest::new("m", "hi").with_params(2.5, 100);
        assert!(matches!(
            client().build_request(&request),
            Err(InferenceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn wire_body_shape() {
        let request = ChatRequest::new("gemma3", "hello").with_params(0.5, 64);
        let built = client().build_request(&request).unwrap();
        let json = serde_json::to_value(OllamaChatRequest::from(&built)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gemma3",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": false,
                "options": {"temperature": 0.5, "num_predict": 64}
            })
        );
    }
}
