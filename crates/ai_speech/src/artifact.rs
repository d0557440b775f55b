//! Scoped lifecycle for intermediate audio files
//!
//! Every file the pipeline creates is registered when it is acquired and
//! removed when its [`ScopedArtifact`] guard drops, on success, error or
//! panic alike. Files whose removal failed (or whose guard never ran) stay in
//! the [`ArtifactRegistry`] until it is flushed at shutdown. A guard turned
//! into an [`AudioArtifact`] with [`ScopedArtifact::persist`] leaves the
//! registry and belongs to the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::SpeechError;
use crate::types::{ArtifactState, AudioArtifact, AudioFormat};

static GLOBAL_REGISTRY: LazyLock<Arc<ArtifactRegistry>> =
    LazyLock::new(|| Arc::new(ArtifactRegistry::new()));

/// Paths of artifacts that have not been released yet
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    entries: Mutex<HashMap<u64, PathBuf>>,
    next_id: AtomicU64,
}

impl ArtifactRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    fn register(&self, path: PathBuf) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().insert(id, path);
        id
    }

    fn deregister(&self, id: u64) {
        self.entries.lock().remove(&id);
    }

    /// Number of artifacts still registered
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether every registered artifact has been released
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Paths still registered
    #[must_use]
    pub fn pending(&self) -> Vec<PathBuf> {
        self.entries.lock().values().cloned().collect()
    }

    /// Remove every registered file; returns how many were released
    ///
    /// Entries whose file cannot be removed stay registered.
    pub fn flush(&self) -> usize {
        let drained: Vec<(u64, PathBuf)> = self.entries.lock().drain().collect();
        let mut released = 0;

        for (id, path) in drained {
            match remove_file(&path) {
                Ok(()) => released += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove artifact during flush");
                    self.entries.lock().insert(id, path);
                },
            }
        }

        if released > 0 {
            info!(released, "Flushed leftover audio artifacts");
        }
        released
    }
}

/// Remove a file, treating "already gone" as success
fn remove_file(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Creates scoped artifacts in one directory
#[derive(Debug, Clone)]
pub struct TempResourceManager {
    dir: PathBuf,
    registry: Arc<ArtifactRegistry>,
}

impl TempResourceManager {
    /// Manager backed by the process-wide registry
    ///
    /// `dir` defaults to the system temp directory.
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self::with_registry(dir, ArtifactRegistry::global())
    }

    /// Manager backed by a private registry
    #[must_use]
    pub fn with_registry(dir: Option<PathBuf>, registry: Arc<ArtifactRegistry>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
            registry,
        }
    }

    /// Directory artifacts are created in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The registry tracking this manager's artifacts
    #[must_use]
    pub fn registry(&self) -> &Arc<ArtifactRegistry> {
        &self.registry
    }

    /// Create an empty file for `format` and register it
    pub fn acquire(&self, format: AudioFormat) -> Result<ScopedArtifact, SpeechError> {
        std::fs::create_dir_all(&self.dir)?;

        let file = tempfile::Builder::new()
            .prefix("speak-l2-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(&self.dir)?;
        let (_, path) = file.keep().map_err(|e| SpeechError::Io(e.error))?;

        let id = self.registry.register(path.clone());
        debug!(path = %path.display(), %format, "Acquired artifact");

        Ok(ScopedArtifact {
            id,
            path,
            format,
            state: ArtifactState::Created,
            registry: Arc::clone(&self.registry),
            persisted: false,
        })
    }

    /// Release everything still registered
    pub fn flush(&self) -> usize {
        self.registry.flush()
    }
}

/// Guard owning one intermediate artifact
///
/// Dropping the guard deletes the file.
#[derive(Debug)]
pub struct ScopedArtifact {
    id: u64,
    path: PathBuf,
    format: AudioFormat,
    state: ArtifactState,
    registry: Arc<ArtifactRegistry>,
    persisted: bool,
}

impl ScopedArtifact {
    /// Location on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> ArtifactState {
        self.state
    }

    /// Record that the file now holds data
    pub fn mark_in_use(&mut self) {
        self.state = ArtifactState::InUse;
    }

    /// Hand the file to the caller; it will not be deleted automatically
    #[must_use]
    pub fn persist(mut self) -> AudioArtifact {
        self.persisted = true;
        self.registry.deregister(self.id);
        debug!(path = %self.path.display(), "Persisted artifact");
        AudioArtifact::new(self.path.clone(), self.format)
    }
}

impl Drop for ScopedArtifact {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }

        match remove_file(&self.path) {
            Ok(()) => {
                self.state = ArtifactState::Released;
                self.registry.deregister(self.id);
                debug!(path = %self.path.display(), "Released artifact");
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to release artifact, leaving it for shutdown flush"
                );
            },
        }
    }
}

/// Flushes a registry when dropped
///
/// Hold one in `main` so leftovers are removed however the process exits
/// its main scope.
#[must_use = "the registry is flushed when the guard is dropped"]
#[derive(Debug)]
pub struct ShutdownGuard {
    registry: Arc<ArtifactRegistry>,
}

impl ShutdownGuard {
    /// Guard for `registry`
    #[must_use]
    pub const fn new(registry: Arc<ArtifactRegistry>) -> Self {
        Self { registry }
    }

    /// Guard for the process-wide registry
    #[must_use]
    pub fn global() -> Self {
        Self::new(ArtifactRegistry::global())
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.registry.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn manager() -> (tempfile::TempDir, TempResourceManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempResourceManager::with_registry(
            Some(dir.path().to_path_buf()),
            Arc::new(ArtifactRegistry::new()),
        );
        (dir, manager)
    }

    #[test]
    fn acquired_file_exists_and_is_registered() {
        let (_dir, manager) = manager();
        let artifact = manager.acquire(AudioFormat::Wav).unwrap();

        assert!(artifact.path().exists());
        assert_eq!(artifact.path().extension().unwrap(), "wav");
        assert_eq!(artifact.state(), ArtifactState::Created);
        assert_eq!(manager.registry().len(), 1);
    }

    #[test]
    fn file_is_removed_when_scope_ends() {
        let (_dir, manager) = manager();
        let path = {
            let mut artifact = manager.acquire(AudioFormat::Mp3).unwrap();
            std::fs::write(artifact.path(), b"data").unwrap();
            artifact.mark_in_use();
            artifact.path().to_path_buf()
        };

        assert!(!path.exists());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn file_is_removed_on_error_path() {
        let (_dir, manager) = manager();
        let mut seen = None;

        let result: Result<(), SpeechError> = (|| {
            let artifact = manager.acquire(AudioFormat::Wav)?;
            seen = Some(artifact.path().to_path_buf());
            Err(SpeechError::AudioProcessing("injected".into()))
        })();

        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn file_is_removed_on_panic() {
        let (_dir, manager) = manager();
        let mut seen = None;

        let result = catch_unwind(AssertUnwindSafe(|| {
            let artifact = manager.acquire(AudioFormat::Wav).unwrap();
            seen = Some(artifact.path().to_path_buf());
            panic!("injected fault");
        }));

        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn persisted_artifact_survives_and_is_deregistered() {
        let (_dir, manager) = manager();
        let artifact = manager.acquire(AudioFormat::Mp3).unwrap().persist();

        assert!(artifact.path().exists());
        assert_eq!(artifact.state(), ArtifactState::InUse);
        assert!(manager.registry().is_empty());

        std::fs::remove_file(artifact.path()).unwrap();
    }

    #[test]
    fn leaked_guard_is_flushed() {
        let (_dir, manager) = manager();
        let artifact = manager.acquire(AudioFormat::Wav).unwrap();
        let path = artifact.path().to_path_buf();
        std::mem::forget(artifact);

        assert!(path.exists());
        assert_eq!(manager.registry().pending(), vec![path.clone()]);

        assert_eq!(manager.flush(), 1);
        assert!(!path.exists());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn shutdown_guard_flushes_on_drop() {
        let (_dir, manager) = manager();
        let artifact = manager.acquire(AudioFormat::Wav).unwrap();
        let path = artifact.path().to_path_buf();
        std::mem::forget(artifact);

        drop(ShutdownGuard::new(Arc::clone(manager.registry())));

        assert!(!path.exists());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let manager =
            TempResourceManager::with_registry(Some(nested.clone()), Arc::new(ArtifactRegistry::new()));

        let artifact = manager.acquire(AudioFormat::Wav).unwrap();
        assert!(artifact.path().starts_with(&nested));
    }
}
