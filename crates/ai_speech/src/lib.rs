//! AI Speech - recognition, synthesis and scoped audio artifacts
//!
//! Provides the speech half of a conversation turn:
//! - [`SpeechPipeline::transcribe`] normalizes a recording, checks it against
//!   the ambient noise floor and sends it to a remote recognizer
//! - [`SpeechPipeline::synthesize`] fetches remote speech, rescales its speed
//!   and encodes the final artifact handed to the caller
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains the remote HTTP adapters
//! - `codec` module contains the FFmpeg and pure-Rust WAV codecs
//! - `artifact` module owns the lifecycle of every intermediate file
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{SpeechConfig, SpeechPipeline, ShutdownGuard};
//! use domain::Language;
//!
//! let _guard = ShutdownGuard::global();
//! let pipeline = SpeechPipeline::from_config(SpeechConfig::default())?;
//!
//! match pipeline.transcribe(path, Language::Japanese).await {
//!     Ok(text) => println!("You said: {text}"),
//!     Err(record) => println!("{}", record.message),
//! }
//!
//! let reply = pipeline.synthesize("こんにちは", Language::Japanese, 1.25).await;
//! ```

pub mod artifact;
pub mod calibration;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod providers;
pub mod types;

pub use artifact::{ArtifactRegistry, ScopedArtifact, ShutdownGuard, TempResourceManager};
pub use calibration::{EnergyAssessment, EnergyCalibration};
pub use codec::{FfmpegCodec, WavCodec, codec_for};
pub use config::{CodecKind, SpeechConfig};
pub use error::SpeechError;
pub use pipeline::{RECOGNITION_SAMPLE_RATE, SpeechPipeline};
pub use ports::{AudioCodec, SpeechRecognizer, SpeechSynthesizer};
pub use providers::{GoogleTranslateSynthesizer, GoogleWebRecognizer};
pub use types::{ArtifactState, AudioArtifact, AudioData, AudioFormat, PcmAudio};
