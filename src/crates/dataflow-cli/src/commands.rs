//! Implementations behind each `dataflow graph <subcommand>`.

use std::path::{Path, PathBuf};

use dataflow_graph::block::Block;
use dataflow_graph::Graph;

use crate::storage;

/// `dataflow graph new --name <name>`: write a fresh, empty graph.
pub fn new_graph(file: &Path, name: &str) -> anyhow::Result<()> {
    let graph = Graph::new(name, storage::default_exec_env());
    storage::save(file, &graph)?;
    println!("created graph '{name}' at {}", file.display());
    Ok(())
}

/// `dataflow graph add-block --name <name> --kind <kind> [--source|--template <text>] [--value k=v]*`.
pub fn add_block(file: &Path, name: &str, kind: &str, source: Option<&str>, values: &[(String, serde_json::Value)]) -> anyhow::Result<()> {
    let mut graph = storage::load(file, storage::default_exec_env())?;

    let block = match kind {
        "base" => Block::new_base(None, name),
        "variable" => Block::new_variable(None, name, values.to_vec()),
        "code" => {
            let source = source.ok_or_else(|| anyhow::anyhow!("--source is required for a code block"))?;
            Block::new_code(None, name, source)
        }
        "llm" => {
            let template = source.ok_or_else(|| anyhow::anyhow!("--template is required for an llm block"))?;
            Block::new_llm(None, name, template)
        }
        other => anyhow::bail!("unknown block kind '{other}' (expected base, variable, code, or llm)"),
    };

    graph.add_block(block)?;
    storage::save(file, &graph)?;
    println!("added {kind} block '{name}'");
    Ok(())
}

/// `dataflow graph connect --from <a> --to <b> [--from-port p] [--to-port p]`.
pub fn connect(file: &Path, from: &str, to: &str, from_port: Option<&str>, to_port: Option<&str>) -> anyhow::Result<()> {
    let mut graph = storage::load(file, storage::default_exec_env())?;
    let conn_id = graph.connect_blocks(from, to, from_port, to_port, true)?;
    storage::save(file, &graph)?;
    println!("connected '{from}' -> '{to}' (connection {conn_id})");
    Ok(())
}

/// `dataflow graph run`: evaluate every block in topological order.
pub async fn run(file: &Path) -> anyhow::Result<()> {
    let mut graph = storage::load(file, storage::default_exec_env())?;
    graph.run_all_blocks().await?;
    storage::save(file, &graph)?;
    println!("ran graph '{}'", graph.name());
    Ok(())
}

/// `dataflow graph serialize`: print the stored graph's JSON to stdout.
pub fn serialize(file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?;
    let view = dataflow_graph::serialization::SerializedGraph::from_json(&text)?;
    println!("{}", view.to_json()?);
    Ok(())
}

/// Parse a `name=json_value` pair from `--value` into `(name, Value)`.
pub fn parse_value_pair(raw: &str) -> anyhow::Result<(String, serde_json::Value)> {
    let (name, raw_value) =
        raw.split_once('=').ok_or_else(|| anyhow::anyhow!("--value must be 'name=value', got '{raw}'"))?;
    let value = serde_json::from_str(raw_value).unwrap_or_else(|_| serde_json::Value::String(raw_value.to_string()));
    Ok((name.to_string(), value))
}

/// Resolve the `--file` option to a concrete path, falling back to
/// [`storage::DEFAULT_GRAPH_FILE`].
pub fn resolve_file(file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(storage::DEFAULT_GRAPH_FILE))
}
