//! Model port - Interface to the language model backend

use async_trait::async_trait;
use domain::{ChatRequest, ModelResponse};
#[cfg(test)]
use mockall::automock;

/// Port for chat completion and model discovery
///
/// Failures are carried in-band: `chat` answers with
/// [`ModelResponse::Error`] and `list_models` with an empty list.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelPort: Send + Sync {
    /// Ask the model for the next reply
    async fn chat(&self, request: &ChatRequest) -> ModelResponse;

    /// Installed model identifiers, in backend order without duplicates
    async fn list_models(&self) -> Vec<String>;

    /// Whether the backend answers at all
    async fn is_healthy(&self) -> bool;

    /// Model used when a request names none
    fn default_model(&self) -> String;
}
