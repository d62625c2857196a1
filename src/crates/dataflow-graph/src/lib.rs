//! # dataflow-graph
//!
//! Core engine for a dataflow graph: typed ports wired together by directed
//! connections, grouped into hubs on either side of a block, scheduled by a
//! deterministic evaluation-order planner, and executed by walking that order
//! and dispatching `Code`/`LLMBlock` bodies into a pluggable
//! [`exec_env::ExecutionEnvironment`].
//!
//! ## Modules
//!
//! - [`value`] / [`cell`] — the opaque value type and the per-port value slot
//!   that tracks `available`/`reliable` state.
//! - [`port`] — named value slots with a connection set.
//! - [`connection`] — directed edges between an output port and an input port.
//! - [`hub`] — ordered, named collections of ports on one side of a block.
//! - [`block`] — the `BaseBlock`/`Variable`/`Code`/`LLMBlock` specializations.
//! - [`graph`] — owns blocks and connections; BFS queries, the evaluation-order
//!   planner, reliability propagation, and the sequential run drivers.
//! - [`serialization`] — the round-trip wire format (`SerializedGraph`) and its
//!   two-pass deserializer.
//! - [`exec_env`] — the trait boundary `Code`/`LLMBlock` dispatch into; concrete
//!   adapters live in the sibling `dataflow-sandbox` crate.
//! - [`error`] — the single `GraphError` enum every fallible operation here
//!   returns.
//! - [`id`] — short random identifiers for ports/blocks/connections/graphs.

pub mod block;
pub mod cell;
pub mod connection;
pub mod error;
pub mod exec_env;
pub mod graph;
pub mod hub;
pub mod id;
pub mod port;
pub mod serialization;
pub mod value;

pub use block::{Block, BlockKind};
pub use connection::Connection;
pub use error::{GraphError, Result};
pub use exec_env::ExecutionEnvironment;
pub use graph::Graph;
pub use hub::{Hub, HubKind};
pub use port::Port;
pub use value::Value;
