//! Error types for graph construction, wiring, and evaluation.
//!
//! All errors that can surface from building or running a [`crate::graph::Graph`]
//! are collected into a single [`GraphError`] enum so callers get one `Result`
//! type to propagate with `?`, the way `langgraph_core::error::GraphError` does
//! for the graph-execution crate it was grounded on.
//!
//! # Example
//!
//! ```rust
//! use dataflow_graph::error::GraphError;
//!
//! fn handle(err: GraphError) -> String {
//!     match err {
//!         GraphError::BlockNotFound(name) => format!("no such block: {name}"),
//!         GraphError::DanglingConnection(id) => format!("connection {id} references nothing"),
//!         other => other.to_string(),
//!     }
//! }
//! ```

use thiserror::Error;

/// Convenience alias for `Result<T, GraphError>`.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Everything that can go wrong while building, wiring, or running a graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A hub already has a port under this name.
    ///
    /// Hubs enforce unique port names within themselves (the input hub and
    /// output hub of the same block are independent namespaces, so the same
    /// name may appear once on each side).
    #[error("hub already has a port named '{0}'")]
    DuplicatePortName(String),

    /// A port was looked up on a hub that doesn't have it.
    #[error("no port named '{port}' on the {hub} hub of block '{block}'")]
    UnknownPortName {
        /// Block the hub belongs to.
        block: String,
        /// Which hub (`inputs` or `outputs`) was searched.
        hub: String,
        /// The port name that wasn't found.
        port: String,
    },

    /// Attempted to add or remove a port on a hub that has been frozen.
    ///
    /// Block kinds that ship with a fixed port layout (for example the
    /// built-in Code and LLM blocks) mark their hubs non-editable after
    /// construction; only Variable and Base blocks allow runtime rewiring
    /// of their own port set.
    #[error("hub is not editable")]
    HubNotEditable,

    /// A graph already has a block registered under this name.
    #[error("graph already has a block named '{0}'")]
    DuplicateBlockName(String),

    /// A graph operation referenced a block name that isn't registered.
    #[error("no block named '{0}' in this graph")]
    BlockNotFound(String),

    /// The requested wiring would introduce a cycle.
    ///
    /// The engine only evaluates DAGs; `getBlockEvaluationOrder` detects
    /// cycles by noticing that some blocks never reach level 0 dependency
    /// count, and this variant is raised when that happens.
    #[error("graph contains a cycle touching block '{0}'")]
    CyclicGraph(String),

    /// A connection referenced an endpoint (block, hub, or port) that does
    /// not exist in the graph being constructed.
    #[error("connection endpoint is invalid: {0}")]
    InvalidEndpoint(String),

    /// Deserialization referenced a connection id that no port ever claims.
    ///
    /// This is always a fatal error during graph load: a connection with no
    /// owning ports on either side cannot be an artifact of a valid export,
    /// since every live connection is added to at least one port's
    /// connection set at creation time.
    #[error("connection '{0}' is dangling: no port references it")]
    DanglingConnection(String),

    /// A block's `run` failed.
    #[error("block '{block}' failed to run: {reason}")]
    ExecutionFailed {
        /// Name of the block that failed.
        block: String,
        /// Human-readable failure reason returned by the execution
        /// environment or completion provider.
        reason: String,
    },

    /// The graph JSON/YAML document was structurally malformed.
    #[error("malformed graph document: {0}")]
    Malformed(String),

    /// Wraps `serde_json` (de)serialization failures.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Shorthand for [`GraphError::UnknownPortName`].
    pub fn unknown_port(block: impl Into<String>, hub: impl Into<String>, port: impl Into<String>) -> Self {
        Self::UnknownPortName { block: block.into(), hub: hub.into(), port: port.into() }
    }

    /// Shorthand for [`GraphError::ExecutionFailed`].
    pub fn execution_failed(block: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed { block: block.into(), reason: reason.into() }
    }
}
