//! `KvStore`: the opaque persistence backend the engine's adapters sit on.
//!
//! The spec's persistence keyspace (`graph:{id}`, `user:{username}:graphs`,
//! `graph:{id}:permissions`) needs three primitive shapes — a hash (field to
//! value), a set (membership), and a plain string — so the trait exposes
//! exactly those, mirroring how `langgraph_core::store::Store` exposes a flat
//! key/value surface and leaves richer shapes to its caller. Unlike that
//! trait, this one is typed around hash/set operations directly instead of
//! layering them on top of a single `get`/`put`, since the registry keyspace
//! genuinely needs hash-field and set-member granularity (e.g. sharing a
//! graph with one more user must not require rewriting the whole permissions
//! map).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

/// Async key-value store with hash, set, and plain string operations.
///
/// Implementations are expected to be cheap to clone behind an `Arc` and
/// safe to call concurrently.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read one field of a hash key.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Write one field of a hash key.
    async fn hash_set(&self, key: &str, field: &str, value: String) -> Result<()>;

    /// Read every field of a hash key.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Whether a hash key has any fields at all.
    async fn hash_exists(&self, key: &str) -> Result<bool>;

    /// Remove a single field from a hash key.
    async fn hash_delete(&self, key: &str, field: &str) -> Result<bool>;

    /// Add a member to a set key.
    async fn set_add(&self, key: &str, member: String) -> Result<bool>;

    /// Remove a member from a set key.
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// List every member of a set key.
    async fn set_members(&self, key: &str) -> Result<HashSet<String>>;

    /// Whether any key (hash or set) exists under this name.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete a key (hash or set) entirely.
    async fn delete(&self, key: &str) -> Result<bool>;
}

#[derive(Default)]
struct Keyspace {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, HashSet<String>>,
}

/// Thread-safe in-memory [`KvStore`], suitable for local development, tests,
/// and the single-process reference deployment of `dataflow-gateway`.
///
/// Mirrors `langgraph_checkpoint::InMemoryCheckpointSaver`'s shape: one
/// `Arc<RwLock<_>>`-guarded map, ephemeral across restarts, no external
/// dependency.
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    inner: Arc<RwLock<Keyspace>>,
}

impl InMemoryKvStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let ks = self.inner.read().await;
        Ok(ks.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hash_set(&self, key: &str, field: &str, value: String) -> Result<()> {
        let mut ks = self.inner.write().await;
        ks.hashes.entry(key.to_string()).or_default().insert(field.to_string(), value);
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let ks = self.inner.read().await;
        Ok(ks.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hash_exists(&self, key: &str) -> Result<bool> {
        let ks = self.inner.read().await;
        Ok(ks.hashes.get(key).is_some_and(|h| !h.is_empty()))
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<bool> {
        let mut ks = self.inner.write().await;
        Ok(ks.hashes.get_mut(key).is_some_and(|h| h.remove(field).is_some()))
    }

    async fn set_add(&self, key: &str, member: String) -> Result<bool> {
        let mut ks = self.inner.write().await;
        Ok(ks.sets.entry(key.to_string()).or_default().insert(member))
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        let mut ks = self.inner.write().await;
        Ok(ks.sets.get_mut(key).is_some_and(|s| s.remove(member)))
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>> {
        let ks = self.inner.read().await;
        Ok(ks.sets.get(key).cloned().unwrap_or_default())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let ks = self.inner.read().await;
        Ok(ks.hashes.get(key).is_some_and(|h| !h.is_empty()) || ks.sets.get(key).is_some_and(|s| !s.is_empty()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut ks = self.inner.write().await;
        let had_hash = ks.hashes.remove(key).is_some();
        let had_set = ks.sets.remove(key).is_some();
        Ok(had_hash || had_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_set_then_get_round_trips() {
        let store = InMemoryKvStore::new();
        store.hash_set("graph:1", "owner", "alice".into()).await.unwrap();
        assert_eq!(store.hash_get("graph:1", "owner").await.unwrap(), Some("alice".to_string()));
        assert!(store.hash_exists("graph:1").await.unwrap());
    }

    #[tokio::test]
    async fn set_add_is_idempotent_and_tracks_membership() {
        let store = InMemoryKvStore::new();
        assert!(store.set_add("user:bob:graphs", "g1".into()).await.unwrap());
        assert!(!store.set_add("user:bob:graphs", "g1".into()).await.unwrap());
        let members = store.set_members("user:bob:graphs").await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(store.set_remove("user:bob:graphs", "g1").await.unwrap());
        assert!(store.set_members("user:bob:graphs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_both_hash_and_set_shapes() {
        let store = InMemoryKvStore::new();
        store.hash_set("k", "f", "v".into()).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.exists("k").await.unwrap());
    }
}
