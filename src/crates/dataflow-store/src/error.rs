//! Error type for the KV store and graph registry.

use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Everything that can go wrong talking to the persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested hash/set/string key does not exist.
    #[error("key '{0}' not found")]
    NotFound(String),

    /// The serialized graph payload at a key could not be parsed.
    #[error("stored graph payload for '{0}' is malformed: {1}")]
    MalformedGraph(String, String),

    /// The permissions hash has no entry for the requesting user, or the
    /// entry doesn't grant the requested bit.
    #[error("user '{0}' is not permitted to {1} graph '{2}'")]
    PermissionDenied(String, String, String),

    /// Wraps a `serde_json` (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
