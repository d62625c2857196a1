//! Loads and saves the single graph each `dataflow graph` subcommand
//! operates on from/to a local JSON file, since each invocation is a fresh
//! process and has no in-memory graph to carry state between commands.

use std::path::Path;
use std::sync::Arc;

use dataflow_graph::serialization::{self, SerializedGraph};
use dataflow_graph::{ExecutionEnvironment, Graph};
use dataflow_sandbox::LocalCodeRunner;

/// Default path a `dataflow graph` subcommand reads/writes when `--file`
/// isn't given.
pub const DEFAULT_GRAPH_FILE: &str = "dataflow-graph.json";

/// Build the offline [`LocalCodeRunner`] every CLI subcommand deserializes
/// against.
pub fn default_exec_env() -> Arc<dyn ExecutionEnvironment> {
    Arc::new(LocalCodeRunner::offline_default())
}

/// Load the graph stored at `path`.
pub fn load(path: &Path, exec_env: Arc<dyn ExecutionEnvironment>) -> anyhow::Result<Graph> {
    let text = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    let view = SerializedGraph::from_json(&text)?;
    Ok(serialization::deserialize(&view, exec_env)?)
}

/// Persist `graph` to `path` as pretty-printed JSON.
pub fn save(path: &Path, graph: &Graph) -> anyhow::Result<()> {
    let view = serialization::serialize(graph);
    let text = serde_json::to_string_pretty(&view)?;
    std::fs::write(path, text).map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))?;
    Ok(())
}
