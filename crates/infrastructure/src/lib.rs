//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of `ai_core` and `ai_speech`,
//! and owns configuration loading and tracing setup.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::build_orchestrator;
pub use config::{AppConfig, ConfigError, InferenceAppConfig, TelemetryAppConfig};
pub use telemetry::{TelemetryError, init_tracing};
