//! Error type shared by the sandbox adapters.

use thiserror::Error;

/// Result alias for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Everything that can go wrong running a formatted program or completing a
/// prompt, before it gets translated into [`dataflow_graph::GraphError::ExecutionFailed`]
/// by the calling block.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// The interpreter process exited non-zero.
    #[error("process exited with status {0}: {1}")]
    NonZeroExit(i32, String),

    /// The process didn't finish within the configured budget.
    #[error("execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The interpreter's stdout wasn't the expected output-name → value JSON
    /// object.
    #[error("could not parse sandbox output: {0}")]
    UnparsableOutput(String),

    /// Spawning the interpreter process itself failed.
    #[error("failed to launch interpreter: {0}")]
    Spawn(#[from] std::io::Error),

    /// An HTTP-backed completion provider's request failed or returned a
    /// body that didn't match the expected shape.
    #[error("completion request failed: {0}")]
    Completion(String),
}
