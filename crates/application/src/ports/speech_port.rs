//! Speech port - Interface for transcription and synthesis

use std::path::Path;

use async_trait::async_trait;
use domain::{AudioArtifact, ErrorRecord, Language};
#[cfg(test)]
use mockall::automock;

/// Port for speech processing operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Transcribe a recorded audio file
    ///
    /// # Arguments
    /// * `audio_file` - Path of the recording, in any supported format
    /// * `language` - Practice language the user spoke
    ///
    /// # Returns
    /// The transcript, or a speech record whose message is user guidance
    async fn transcribe(&self, audio_file: &Path, language: Language)
    -> Result<String, ErrorRecord>;

    /// Synthesize `text` played back at `speed`
    ///
    /// Returns `None` when there is nothing to say or synthesis failed. The
    /// artifact is owned by the caller.
    async fn synthesize(&self, text: &str, language: Language, speed: f32)
    -> Option<AudioArtifact>;
}
