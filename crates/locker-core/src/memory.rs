//! In-memory store implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{LockError, LockResult};
use crate::store::Store;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// HashMap-backed [`Store`]. Always available; used for tests, benches, and
/// single-process coordination.
///
/// With a TTL configured, entries expire that long after their last
/// successful acquire/refresh, mirroring coordination-service lease expiry.
/// Without one, entries live until deleted.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Option<Duration>,
}

impl MemoryStore {
    /// Creates a store whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose entries expire `ttl` after their last refresh.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Seeds a value directly, bypassing the acquire path.
    pub fn set(&self, name: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            name.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
            },
        );
    }
}

impl Store for MemoryStore {
    async fn get(&self, name: &str) -> LockResult<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(name) {
            Some(entry) if !entry.is_expired() => Ok(entry.value.clone()),
            Some(_) => {
                entries.remove(name);
                Err(LockError::NotFound(name.to_string()))
            }
            None => Err(LockError::NotFound(name.to_string())),
        }
    }

    async fn acquire_or_refresh(&self, name: &str, value: &str) -> LockResult<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(name) {
            if !entry.is_expired() && entry.value != value {
                return Err(LockError::Denied(name.to_string()));
            }
        }
        entries.insert(
            name.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, name: &str) -> LockResult<()> {
        self.entries.lock().unwrap().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_after_acquire_returns_the_value() {
        let store = MemoryStore::new();
        store.acquire_or_refresh("svc", "ok").await.unwrap();
        assert_eq!(store.get("svc").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn get_of_missing_lock_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("svc").await.unwrap_err();
        assert!(matches!(err, LockError::NotFound(_)));
    }

    #[tokio::test]
    async fn conflicting_acquire_is_denied_and_leaves_value_intact() {
        let store = MemoryStore::new();
        store.acquire_or_refresh("svc", "ours").await.unwrap();
        let err = store.acquire_or_refresh("svc", "theirs").await.unwrap_err();
        assert!(matches!(err, LockError::Denied(_)));
        assert_eq!(store.get("svc").await.unwrap(), "ours");
    }

    #[tokio::test]
    async fn refresh_with_same_value_succeeds() {
        let store = MemoryStore::new();
        store.acquire_or_refresh("svc", "ok").await.unwrap();
        store.acquire_or_refresh("svc", "ok").await.unwrap();
    }

    #[tokio::test]
    async fn entries_expire_without_refresh() {
        let store = MemoryStore::with_ttl(Duration::from_millis(30));
        store.acquire_or_refresh("svc", "ours").await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(matches!(
            store.get("svc").await,
            Err(LockError::NotFound(_))
        ));
        // an expired entry is up for grabs
        store.acquire_or_refresh("svc", "theirs").await.unwrap();
        assert_eq!(store.get("svc").await.unwrap(), "theirs");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.delete("svc").await.unwrap();
        store.set("svc", "ok");
        store.delete("svc").await.unwrap();
        assert!(matches!(
            store.get("svc").await,
            Err(LockError::NotFound(_))
        ));
    }
}
