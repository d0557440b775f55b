//! AI Core - Language model client and request resilience
//!
//! Talks to an Ollama-compatible backend over HTTP. Every call returns a
//! classified outcome instead of failing across the pipeline boundary.

pub mod config;
pub mod error;
pub mod ollama;
pub mod ports;
pub mod prompts;
pub mod retry;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use ollama::OllamaClient;
pub use ports::ModelClient;
pub use retry::{Classify, RetryPolicy, RetryResult, with_retry};
