//! Local activation cache.
//!
//! The cache is advisory: the authority owns the truth about bindings.
//! Locally we only remember the token, the fingerprint it was issued to,
//! and when it was last verified online — the inputs the state machine
//! needs for the offline-grace decision.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The locally persisted activation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCache {
    /// Bearer token issued at activation.
    pub token: String,
    /// Fingerprint the token was issued to.
    pub fingerprint: String,
    /// When the device was activated.
    pub activated_at: DateTime<Utc>,
    /// Last successful online verification.
    pub last_verified_at: DateTime<Utc>,
}

/// Persistence seam for the activation cache.
pub trait CacheStore: Send + Sync {
    /// Load the cached activation, if a readable one exists.
    fn load(&self) -> Option<ActivationCache>;
    /// Persist the activation.
    fn save(&self, cache: &ActivationCache);
    /// Remove the activation.
    fn purge(&self);
}

/// File-backed cache store.
///
/// A corrupt or unreadable file is treated as no cache at all. When the
/// file cannot be written (read-only media, sandboxed environments) the
/// record degrades to in-memory only and lasts for the session.
#[derive(Debug)]
pub struct FileCacheStore {
    path: PathBuf,
    session_fallback: Mutex<Option<ActivationCache>>,
}

impl FileCacheStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session_fallback: Mutex::new(None),
        }
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<ActivationCache> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(path = %self.path.display(), "Discarding corrupt activation cache: {e}");
                    None
                }
            },
            Err(_) => self
                .session_fallback
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
        }
    }

    fn save(&self, cache: &ActivationCache) {
        let raw = match serde_json::to_string(cache) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize activation cache: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), "Activation cache not persisted, keeping in memory: {e}");
            if let Ok(mut guard) = self.session_fallback.lock() {
                *guard = Some(cache.clone());
            }
        }
    }

    fn purge(&self) {
        let _ = std::fs::remove_file(&self.path);
        if let Ok(mut guard) = self.session_fallback.lock() {
            *guard = None;
        }
    }
}

/// In-memory cache store, used in tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    inner: Mutex<Option<ActivationCache>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with an activation.
    pub fn with_cache(cache: ActivationCache) -> Self {
        Self {
            inner: Mutex::new(Some(cache)),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Option<ActivationCache> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, cache: &ActivationCache) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(cache.clone());
        }
    }

    fn purge(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActivationCache {
        let stamp = "2026-03-01T10:00:00Z".parse().unwrap();
        ActivationCache {
            token: "t".repeat(64),
            fingerprint: "fp_abc_12".to_string(),
            activated_at: stamp,
            last_verified_at: stamp,
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("activation.json"));

        assert!(store.load().is_none());
        store.save(&sample());
        assert_eq!(store.load(), Some(sample()));
        store.purge();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activation.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileCacheStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_unwritable_path_falls_back_to_memory() {
        let store = FileCacheStore::new("/nonexistent-dir/activation.json");
        store.save(&sample());
        assert_eq!(store.load(), Some(sample()));
        store.purge();
        assert!(store.load().is_none());
    }
}
