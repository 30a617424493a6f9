//! Best-effort persistence for the cached session identity.
//!
//! One entry (`{user, timestamp}`) lives behind the [`CacheStorage`] seam.
//! Storage failures of any kind are swallowed: the cache only exists so a
//! returning user renders instantly, and correctness never depends on it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::User;

/// How long a cached identity may serve as startup state before it is
/// discarded unread.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Consumer-provided storage for the single session-cache entry.
///
/// Implementations must not propagate failures (full disk, missing
/// directory, read-only mount): log and move on.
pub trait CacheStorage: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str);
    fn remove(&self);
}

/// File-backed storage, one JSON document per file.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStorage for FileStorage {
    fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn save(&self, value: &str) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.path, value) {
            tracing::debug!(error = %e, path = %self.path.display(), "session cache write failed");
        }
    }

    fn remove(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// In-memory storage for tests and embedders that want no persistence.
#[derive(Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.value.lock().clone()
    }

    fn save(&self, value: &str) {
        *self.value.lock() = Some(value.to_string());
    }

    fn remove(&self) {
        *self.value.lock() = None;
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    user: User,
    /// Write time, milliseconds since the Unix epoch.
    timestamp: u64,
}

/// The session cache: one `{user, timestamp}` entry with a 24-hour TTL.
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct SessionCache {
    storage: Arc<dyn CacheStorage>,
    ttl: Duration,
}

impl SessionCache {
    #[must_use]
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            storage,
            ttl: USER_CACHE_TTL,
        }
    }

    /// Override the entry TTL (default 24 hours).
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Read the cached identity, if present and younger than the TTL.
    /// Expired or unreadable entries are removed on the way out.
    #[must_use]
    pub fn load(&self) -> Option<User> {
        self.load_at(now_millis())
    }

    fn load_at(&self, now_ms: u64) -> Option<User> {
        let raw = self.storage.load()?;
        let Ok(envelope) = serde_json::from_str::<CacheEnvelope>(&raw) else {
            self.storage.remove();
            return None;
        };
        let age = Duration::from_millis(now_ms.saturating_sub(envelope.timestamp));
        if age < self.ttl {
            Some(envelope.user)
        } else {
            self.storage.remove();
            None
        }
    }

    /// Persist the identity with the current timestamp.
    pub fn save(&self, user: &User) {
        self.save_at(user, now_millis());
    }

    fn save_at(&self, user: &User, now_ms: u64) {
        let envelope = CacheEnvelope {
            user: user.clone(),
            timestamp: now_ms,
        };
        match serde_json::to_string(&envelope) {
            Ok(raw) => self.storage.save(&raw),
            Err(e) => tracing::debug!(error = %e, "session cache encode failed"),
        }
    }

    /// Drop the cached identity.
    pub fn clear(&self) {
        self.storage.remove();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_str(
            r#"{
                "id": "7f8f0f7e-2a64-4bcb-9f3e-0d9a3e1c6a55",
                "name": "Ada",
                "email": "ada@example.com",
                "created_at": "2024-03-01T10:15:00Z"
            }"#,
        )
        .unwrap()
    }

    fn cache_with_memory() -> (SessionCache, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (SessionCache::new(storage.clone()), storage)
    }

    #[test]
    fn roundtrip_within_ttl() {
        let (cache, _) = cache_with_memory();
        let user = sample_user();
        cache.save_at(&user, 1_000);
        assert_eq!(cache.load_at(1_000 + 60_000), Some(user));
    }

    #[test]
    fn expired_entry_is_removed_on_read() {
        let (cache, storage) = cache_with_memory();
        cache.save_at(&sample_user(), 0);
        let after_ttl = USER_CACHE_TTL.as_millis() as u64 + 1;
        assert_eq!(cache.load_at(after_ttl), None);
        assert!(storage.load().is_none(), "expired entry should be cleared");
    }

    #[test]
    fn entry_at_exact_ttl_boundary_is_expired() {
        let (cache, _) = cache_with_memory();
        cache.save_at(&sample_user(), 0);
        assert_eq!(cache.load_at(USER_CACHE_TTL.as_millis() as u64), None);
    }

    #[test]
    fn corrupt_entry_is_removed_on_read() {
        let (cache, storage) = cache_with_memory();
        storage.save("not json");
        assert_eq!(cache.load(), None);
        assert!(storage.load().is_none());
    }

    #[test]
    fn clear_removes_entry() {
        let (cache, storage) = cache_with_memory();
        cache.save(&sample_user());
        cache.clear();
        assert!(storage.load().is_none());
    }

    #[test]
    fn clock_going_backwards_keeps_entry() {
        let (cache, _) = cache_with_memory();
        cache.save_at(&sample_user(), 10_000);
        // saturating age: a timestamp from the "future" reads as age zero
        assert!(cache.load_at(5_000).is_some());
    }

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        storage.save("payload");
        assert_eq!(storage.load().as_deref(), Some("payload"));
        storage.remove();
        assert!(storage.load().is_none());
        // removing twice is harmless
        storage.remove();
    }

    #[test]
    fn file_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert!(storage.load().is_none());
    }
}
