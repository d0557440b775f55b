//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod model_port;
mod speech_port;

#[cfg(test)]
pub use model_port::MockModelPort;
pub use model_port::ModelPort;
#[cfg(test)]
pub use speech_port::MockSpeechPort;
pub use speech_port::SpeechPort;
