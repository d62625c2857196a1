//! `GraphRegistry`: the exact keyspace the original service layer used, built
//! on top of a [`crate::kv::KvStore`].
//!
//! - `graph:{id}` — hash with fields `owner`, `serialized_graph`.
//! - `user:{username}:graphs` — set of graph ids.
//! - `graph:{id}:permissions` — hash from username to an integer permission
//!   bitmap (bit 0 = view, bit 1 = edit|delete, bit 2 = run).

use std::sync::Arc;

use dataflow_graph::id;

use crate::error::{Result, StoreError};
use crate::kv::KvStore;

/// Bit 0: the user may view the graph.
pub const PERM_VIEW: u32 = 1 << 0;
/// Bit 1: the user may edit or delete the graph.
pub const PERM_EDIT: u32 = 1 << 1;
/// Bit 2: the user may run the graph.
pub const PERM_RUN: u32 = 1 << 2;

fn graph_key(id: &str) -> String {
    format!("graph:{id}")
}

fn user_graphs_key(username: &str) -> String {
    format!("user:{username}:graphs")
}

fn permissions_key(id: &str) -> String {
    format!("graph:{id}:permissions")
}

/// Registry of graphs, owners, and per-user permission bitmaps, wired on top
/// of a pluggable [`KvStore`] the same way `langgraph_core::store::Store` is
/// wired under a higher-level checkpointing API: this crate owns the
/// keyspace shape, the store owns the bytes.
#[derive(Clone)]
pub struct GraphRegistry {
    store: Arc<dyn KvStore>,
}

impl GraphRegistry {
    /// Build a registry on top of `store`.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Register a new graph id for `owner`, with no serialized payload yet.
    ///
    /// Returns the freshly minted graph id (graph-length, per
    /// [`dataflow_graph::id::graph_id`]).
    pub async fn create_graph(&self, owner: &str) -> Result<String> {
        tooling::logging::timed("create_graph", async {
            let id = id::graph_id();
            self.store.hash_set(&graph_key(&id), "owner", owner.to_string()).await?;
            self.store.set_add(&user_graphs_key(owner), id.clone()).await?;
            self.store.hash_set(&permissions_key(&id), owner, (PERM_VIEW | PERM_EDIT | PERM_RUN).to_string()).await?;
            Ok(id)
        })
        .await
    }

    /// The serialized graph bytes stored under `id`, if any.
    pub async fn get_serialized_graph(&self, id: &str) -> Result<Option<String>> {
        self.store.hash_get(&graph_key(id), "serialized_graph").await
    }

    /// Overwrite the serialized graph bytes stored under `id`.
    pub async fn store_serialized_graph(&self, id: &str, serialized: String) -> Result<()> {
        if !self.store.exists(&graph_key(id)).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.store.hash_set(&graph_key(id), "serialized_graph", serialized).await
    }

    /// The owning username for `id`.
    pub async fn owner(&self, id: &str) -> Result<String> {
        self.store
            .hash_get(&graph_key(id), "owner")
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Remove a graph entirely: its hash, its owner's set membership, and
    /// its permissions hash.
    pub async fn delete_graph(&self, id: &str) -> Result<()> {
        tooling::logging::timed("delete_graph", async {
            let owner = self.owner(id).await?;
            tracing::info!(graph_id = %id, %owner, "deleting graph");
            self.store.delete(&graph_key(id)).await?;
            self.store.set_remove(&user_graphs_key(&owner), id).await?;
            self.store.delete(&permissions_key(id)).await?;
            Ok(())
        })
        .await
    }

    /// Every graph id `username` owns or has been shared.
    pub async fn list_graphs(&self, username: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.store.set_members(&user_graphs_key(username)).await?.into_iter().collect();
        ids.sort();
        Ok(ids)
    }

    /// Grant `target_user` the permission bits in `bits` on graph `id`, and
    /// record the share in their graph list.
    pub async fn share_graph(&self, id: &str, target_user: &str, bits: u32) -> Result<()> {
        if !self.store.exists(&graph_key(id)).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.store.hash_set(&permissions_key(id), target_user, bits.to_string()).await?;
        self.store.set_add(&user_graphs_key(target_user), id.to_string()).await?;
        Ok(())
    }

    /// The raw permission bitmap `username` holds on graph `id`, or `0` if
    /// they have none.
    pub async fn permission_bits(&self, id: &str, username: &str) -> Result<u32> {
        let bits = self.store.hash_get(&permissions_key(id), username).await?;
        Ok(bits.and_then(|b| b.parse().ok()).unwrap_or(0))
    }

    /// Whether `username` holds every bit in `required` on graph `id`.
    pub async fn has_permission(&self, id: &str, username: &str, required: u32) -> Result<bool> {
        Ok(self.permission_bits(id, username).await? & required == required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;

    fn registry() -> GraphRegistry {
        GraphRegistry::new(Arc::new(InMemoryKvStore::new()))
    }

    #[tokio::test]
    async fn create_graph_grants_owner_full_permissions() {
        let reg = registry();
        let id = reg.create_graph("alice").await.unwrap();
        assert_eq!(reg.owner(&id).await.unwrap(), "alice");
        assert!(reg.has_permission(&id, "alice", PERM_VIEW | PERM_EDIT | PERM_RUN).await.unwrap());
        assert_eq!(reg.list_graphs("alice").await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn share_graph_grants_bits_to_target_user() {
        let reg = registry();
        let id = reg.create_graph("alice").await.unwrap();
        reg.share_graph(&id, "bob", PERM_VIEW).await.unwrap();
        assert!(reg.has_permission(&id, "bob", PERM_VIEW).await.unwrap());
        assert!(!reg.has_permission(&id, "bob", PERM_EDIT).await.unwrap());
        assert!(reg.list_graphs("bob").await.unwrap().contains(&id));
    }

    #[tokio::test]
    async fn delete_graph_removes_owner_listing_and_permissions() {
        let reg = registry();
        let id = reg.create_graph("alice").await.unwrap();
        reg.delete_graph(&id).await.unwrap();
        assert!(reg.owner(&id).await.is_err());
        assert!(reg.list_graphs("alice").await.unwrap().is_empty());
        assert_eq!(reg.permission_bits(&id, "alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn store_serialized_graph_round_trips() {
        let reg = registry();
        let id = reg.create_graph("alice").await.unwrap();
        reg.store_serialized_graph(&id, "{\"blocks\":{}}".into()).await.unwrap();
        assert_eq!(reg.get_serialized_graph(&id).await.unwrap(), Some("{\"blocks\":{}}".to_string()));
    }

    #[tokio::test]
    async fn store_serialized_graph_fails_for_unknown_id() {
        let reg = registry();
        let err = reg.store_serialized_graph("nope", "{}".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
