//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechRecognizer` and
//! `SpeechSynthesizer` traits.

pub mod google_translate;
pub mod google_web;

pub use google_translate::GoogleTranslateSynthesizer;
pub use google_web::GoogleWebRecognizer;
