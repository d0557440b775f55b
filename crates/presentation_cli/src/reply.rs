//! Ownership of the spoken reply files handed out by the orchestrator

use std::io::ErrorKind;

use domain::AudioArtifact;
use tracing::{debug, warn};

/// Keeps only the latest reply file on disk
///
/// A newer reply deletes the one before it; the last one is deleted when
/// the holder is dropped at the end of the session.
#[derive(Debug, Default)]
pub struct ReplyAudio {
    current: Option<AudioArtifact>,
}

impl ReplyAudio {
    /// Create an empty holder
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Take ownership of a turn's reply; turns without audio keep the previous one
    pub fn replace(&mut self, next: Option<AudioArtifact>) {
        if next.is_none() {
            return;
        }
        if let Some(previous) = std::mem::replace(&mut self.current, next) {
            remove(&previous);
        }
    }

    /// The reply currently kept
    #[must_use]
    pub const fn current(&self) -> Option<&AudioArtifact> {
        self.current.as_ref()
    }
}

impl Drop for ReplyAudio {
    fn drop(&mut self) {
        if let Some(last) = self.current.take() {
            remove(&last);
        }
    }
}

fn remove(artifact: &AudioArtifact) {
    match std::fs::remove_file(artifact.path()) {
        Ok(()) => debug!(path = %artifact.path().display(), "Removed reply audio"),
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => warn!(path = %artifact.path().display(), error = %e, "Failed to remove reply audio"),
    }
}
