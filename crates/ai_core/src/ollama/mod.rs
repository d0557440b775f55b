//! Ollama-compatible chat backend
//!
//! Uses the non-streaming `/api/chat` endpoint and `/api/tags` for listing.

mod client;

pub use client::OllamaClient;
