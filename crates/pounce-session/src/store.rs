//! The abstract expiring key-value collaborator.
//!
//! Room and session state is mirrored to an external store so a restarted
//! process can recover it. The server treats the store as strictly
//! best-effort: every call site logs failures and carries on with the
//! in-memory state. The trait is the seam — production deployments point
//! it at a Redis-shaped service, tests and single-node setups use
//! [`MemoryStore`].

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::StoreError;

/// A key-value store with per-entry expiry.
///
/// Methods return `impl Future + Send` (rather than plain `async fn`) so
/// generic callers can hold the futures across `tokio::spawn` boundaries.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Stores `value` under `key`, expiring after `ttl`. Overwrites and
    /// re-arms the expiry if the key exists.
    fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches the value under `key`, or `None` if absent or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Removes the value under `key`. Removing a missing key is not an
    /// error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process [`KeyValueStore`].
///
/// Expired entries read as absent and are evicted lazily on access; there
/// is no background sweeper, so a never-read key lingers until the next
/// `get` or process exit. Good enough for the best-effort mirror role.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        store
            .put("room:KX7R", b"state".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.get("room:KX7R").await.unwrap();
        assert_eq!(value, Some(b"state".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store
            .put("session:abc", b"x".to_vec(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.get("session:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_rearms_expiry() {
        let store = MemoryStore::new();
        store
            .put("k", b"old".to_vec(), Duration::ZERO)
            .await
            .unwrap();
        store
            .put("k", b"new".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let store = MemoryStore::new();
        store
            .put("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
