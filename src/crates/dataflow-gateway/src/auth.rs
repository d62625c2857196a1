//! `AuthProvider`: the authentication/authorization seam, grounded in
//! `auth_service.py`.
//!
//! The original kept a hardcoded `USER_DATA` token table and checked graph
//! ownership/permission bits straight out of Redis; [`InMemoryAuthProvider`]
//! reproduces both halves, the second by holding the same
//! [`dataflow_store::GraphRegistry`] the rest of the gateway reads from
//! rather than a second copy of the permission bits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dataflow_store::{GraphRegistry, PERM_EDIT, PERM_RUN, PERM_VIEW};
use serde_json::Value;

/// Authenticates bearer tokens and authorizes actions against a graph's
/// permission bitmap.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve `token` to a username, or `None` if it is not recognized.
    async fn authenticate(&self, token: &str) -> Option<String>;

    /// Decide whether `user` may perform `action`, given the request
    /// `payload` (which carries `graph_id` for the actions that need it).
    ///
    /// Returns `(auth_ok, permitted)`: `auth_ok` is `false` only when the
    /// authorization check itself could not be completed (mirrors
    /// `auth_service.py` returning `(False, None)` on a missing
    /// `graph_id`); `permitted` is the actual yes/no answer when `auth_ok`
    /// is `true`.
    async fn authorize(&self, user: &str, action: &str, payload: &Value) -> (bool, bool);
}

/// Reference [`AuthProvider`] backed by a fixed token table and the live
/// [`GraphRegistry`], the way `auth_service.py`'s `USER_DATA` dict plus its
/// Redis permission lookups played the same two roles.
pub struct InMemoryAuthProvider {
    tokens: HashMap<String, String>,
    registry: Arc<GraphRegistry>,
}

impl InMemoryAuthProvider {
    /// Build a provider with no seeded tokens.
    pub fn new(registry: Arc<GraphRegistry>) -> Self {
        Self { tokens: HashMap::new(), registry }
    }

    /// Seed a token → username mapping, mirroring `USER_DATA`'s entries.
    pub fn with_token(mut self, token: impl Into<String>, username: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), username.into());
        self
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn authenticate(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }

    async fn authorize(&self, user: &str, action: &str, payload: &Value) -> (bool, bool) {
        match action {
            "create" | "list" => (true, true),
            "share" => {
                let Some(graph_id) = payload.get("graph_id").and_then(Value::as_str) else { return (false, false) };
                match self.registry.owner(graph_id).await {
                    Ok(owner) => (true, owner == user),
                    Err(_) => (false, false),
                }
            }
            "view" | "edit" | "delete" | "run" => {
                let Some(graph_id) = payload.get("graph_id").and_then(Value::as_str) else { return (false, false) };
                let required = match action {
                    "view" => PERM_VIEW,
                    "edit" | "delete" => PERM_EDIT,
                    "run" => PERM_RUN,
                    _ => unreachable!(),
                };
                match self.registry.has_permission(graph_id, user, required).await {
                    Ok(permitted) => (true, permitted),
                    Err(_) => (true, false),
                }
            }
            _ => (false, false),
        }
    }
}
