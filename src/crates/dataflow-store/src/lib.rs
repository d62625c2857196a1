//! # dataflow-store
//!
//! The opaque persistence backend the core engine treats as an external
//! collaborator (spec §1): an in-process key-value store exposing hash, set,
//! and existence/delete operations, plus a [`registry::GraphRegistry`] that
//! replicates the original service layer's keyspace on top of it.
//!
//! This crate never depends on `dataflow-gateway` or `dataflow-sandbox` — it
//! only knows how to store bytes under the spec's key shapes, the way
//! `langgraph_checkpoint` knows how to store checkpoints without knowing
//! anything about the HTTP surface that triggers them.

pub mod error;
pub mod kv;
pub mod registry;

pub use error::{Result, StoreError};
pub use kv::{InMemoryKvStore, KvStore};
pub use registry::{GraphRegistry, PERM_EDIT, PERM_RUN, PERM_VIEW};
