//! Port definitions for the model backend
//!
//! Defines the trait that model backend adapters must implement.

use async_trait::async_trait;
use domain::{ChatRequest, ModelResponse};

/// A chat-capable language model backend
///
/// Failures are classified and returned in-band; none of these methods
/// return a `Result`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Ask the model for the next reply
    async fn chat(&self, request: &ChatRequest) -> ModelResponse;

    /// Installed model identifiers in backend order, without duplicates
    ///
    /// Empty when the backend cannot be reached or answers with an error.
    async fn list_models(&self) -> Vec<String>;

    /// Whether the backend answers at all
    async fn health_check(&self) -> bool;

    /// Model used when a request names none
    fn default_model(&self) -> &str;
}
