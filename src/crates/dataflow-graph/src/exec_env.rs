//! The execution environment trait boundary.
//!
//! `Code` and `Llm` blocks don't talk to a sandbox process or an LLM
//! provider directly — they dispatch through an `Arc<dyn ExecutionEnvironment>`
//! that the graph holds, the same way `langgraph_core`'s node executors never
//! construct their own `ChatModel` but receive one through configuration.
//! This keeps `dataflow-graph` free of any dependency on how code actually
//! gets run or how text actually gets completed; `dataflow-sandbox` supplies
//! the real adapters.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::value::Value;

/// Pluggable collaborator that runs `Code` block bodies and services `Llm`
/// block prompts.
///
/// Implementations are expected to be cheap to clone behind an `Arc` and
/// safe to call concurrently from multiple blocks.
#[async_trait]
pub trait ExecutionEnvironment: Send + Sync {
    /// Run `source` with `inputs` bound as named values, and return the
    /// requested `outputs` by name.
    ///
    /// An implementation that can't produce one of the requested outputs
    /// should omit it from the returned map rather than erroring, mirroring
    /// `format_code_for_execution`'s best-effort output serialization; a
    /// hard failure (non-zero exit, crash, timeout) should return
    /// `Err(GraphError::ExecutionFailed { .. })`.
    async fn execute_code(
        &self,
        source: &str,
        inputs: &HashMap<String, Value>,
        outputs: &[String],
    ) -> Result<HashMap<String, Value>>;

    /// Submit a formatted prompt and return the completion text.
    async fn complete(&self, prompt: &str, inputs: &HashMap<String, Value>) -> Result<String>;
}
