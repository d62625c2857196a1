//! Round-trip serialization between an in-memory [`crate::graph::Graph`] and
//! the structured wire form described in the data model's §4.8.
//!
//! A [`SerializedGraph`] is the `serde`-friendly mirror of a graph: metadata,
//! a map of block views keyed by block id, and a map of connection views
//! keyed by connection id. It serializes to JSON directly, or — when a text
//! transport needs a single opaque payload — to a base64-wrapped byte stream
//! via [`to_base64`]/[`from_base64`].
//!
//! Deserialization runs in the two passes the spec calls for: first every
//! connection is materialized with unresolved endpoints, then every block's
//! ports are rebuilt and, as each port is linked to the connection ids it
//! claims, the matching connection's `from`/`to` endpoint is resolved
//! in-place. A connection id referenced by a port but absent from the
//! connections map is a fatal [`GraphError::DanglingConnection`].

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind};
use crate::cell::ValueCell;
use crate::connection::{Connection, PortRef};
use crate::error::{GraphError, Result};
use crate::exec_env::ExecutionEnvironment;
use crate::graph::Graph;
use crate::hub::{Hub, HubKind};
use crate::port::Port;
use crate::value::Value;

/// Top-level wire form of a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Graph identity.
    pub metadata: GraphMetadata,
    /// Blocks keyed by their own id (not by name — two blocks never share an
    /// id, whereas the wire format's map key needs to be stable even across
    /// a rename).
    pub blocks: HashMap<String, BlockView>,
    /// Connections keyed by their own id.
    pub connections: HashMap<String, ConnectionView>,
}

/// `{id, name}` identity pair for a serialized graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// The graph's id.
    pub id: String,
    /// The graph's display name.
    pub name: String,
}

/// Wire form of a single block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockView {
    /// The block's own id.
    pub id: String,
    /// The block's name, unique within the graph.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Tagged specialization (`BaseBlock`, `Variable`, `Code`, `LLMBlock`).
    #[serde(rename = "type")]
    pub block_type: String,
    /// The input hub.
    pub inputs: HubView,
    /// The output hub.
    pub outputs: HubView,
}

/// Wire form of a hub: its kind and its ports, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubView {
    /// The hub's own id.
    pub id: String,
    /// Which side of the block this hub is.
    pub kind: HubKind,
    /// Ports keyed by name, in the hub's insertion order is not preserved by
    /// a `HashMap` wire representation — callers that need the canonical
    /// order should rebuild it from [`crate::hub::Hub::names`] on the
    /// in-memory side rather than from this view's iteration order.
    pub ports: HashMap<String, PortView>,
}

/// Wire form of a single port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortView {
    /// The port's own id.
    pub id: String,
    /// Current value, if any.
    pub value: Option<Value>,
    /// Whether a value has ever been written.
    #[serde(default)]
    pub available: bool,
    /// Whether the current value is reliable.
    #[serde(default)]
    pub reliable: bool,
    /// Ids of every connection touching this port.
    pub connections: Vec<String>,
}

/// Wire form of a single connection. Either endpoint may be `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionView {
    /// The connection's own id.
    pub id: String,
    /// The source port's id, if resolved.
    pub from_port: Option<String>,
    /// The destination port's id, if resolved.
    pub to_port: Option<String>,
}

impl SerializedGraph {
    /// Encode as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON string.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Encode as JSON with object keys sorted, so two serializations of the
    /// same graph produce byte-identical output regardless of field
    /// insertion order — the form `dataflow-store` hashes for a dedup key.
    pub fn to_stable_json(&self) -> Result<String> {
        tooling::serialization::to_stable_json(self).map_err(|e| GraphError::Malformed(format!("failed to canonicalize graph JSON: {e}")))
    }

    /// Encode as a base64-wrapped JSON byte stream, for transports that only
    /// carry text.
    pub fn to_base64(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(BASE64.encode(bytes))
    }

    /// Decode from a base64-wrapped JSON byte stream.
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(s)
            .map_err(|e| GraphError::Malformed(format!("invalid base64 graph payload: {e}")))?;
        let graph = serde_json::from_slice(&bytes)?;
        Ok(graph)
    }
}

/// Serialize `graph` into its wire form.
pub fn serialize(graph: &Graph) -> SerializedGraph {
    let mut connections = HashMap::new();
    for id in graph.connection_ids() {
        if let Some(conn) = graph.connection(id) {
            connections.insert(
                id.to_string(),
                ConnectionView {
                    id: conn.id().to_string(),
                    from_port: conn.from().map(|r| r.port_id.clone()),
                    to_port: conn.to().map(|r| r.port_id.clone()),
                },
            );
        }
    }

    let mut blocks = HashMap::new();
    for name in graph.block_names() {
        let block = graph.block(name).expect("name came from block_names");
        blocks.insert(block.id().to_string(), serialize_block(block));
    }

    SerializedGraph {
        metadata: GraphMetadata { id: graph.id().to_string(), name: graph.name().to_string() },
        blocks,
        connections,
    }
}

fn serialize_block(block: &Block) -> BlockView {
    BlockView {
        id: block.id().to_string(),
        name: block.name().to_string(),
        description: block.description().to_string(),
        block_type: block.kind().as_str().to_string(),
        inputs: serialize_hub(block.inputs()),
        outputs: serialize_hub(block.outputs()),
    }
}

fn serialize_hub(hub: &Hub) -> HubView {
    let ports = hub
        .iter()
        .map(|(name, port)| {
            (
                name.to_string(),
                PortView {
                    id: port.id().to_string(),
                    value: port.value().cloned(),
                    available: port.cell().is_available(),
                    reliable: port.cell().is_reliable(),
                    connections: port.connections().map(str::to_string).collect(),
                },
            )
        })
        .collect();
    HubView { id: hub.id().to_string(), kind: hub.kind(), ports }
}

/// Rebuild a [`Graph`] from its wire form.
///
/// Implements the two-pass protocol from §4.8 and §9: connection objects
/// (with unresolved endpoints) are built first, then each block's ports are
/// reconstructed and linked back into the matching connection's `from`/`to`
/// field according to the owning hub's orientation. A port that claims a
/// connection id absent from `serialized.connections` is a fatal
/// [`GraphError::DanglingConnection`].
pub fn deserialize(serialized: &SerializedGraph, exec_env: Arc<dyn ExecutionEnvironment>) -> Result<Graph> {
    let mut connections: HashMap<String, Connection> =
        serialized.connections.keys().map(|id| (id.clone(), Connection::new_unresolved())).collect();

    let mut blocks: HashMap<String, Block> = HashMap::new();

    for view in serialized.blocks.values() {
        let kind = BlockKind::from_str(&view.block_type)
            .ok_or_else(|| GraphError::Malformed(format!("unknown block type '{}'", view.block_type)))?;

        let mut block = build_block(view.id.clone(), view.name.clone(), kind);
        block.set_description(view.description.clone());

        deserialize_hub_into(&mut block, HubKind::Input, &view.inputs, &view.name, &mut connections)?;
        deserialize_hub_into(&mut block, HubKind::Output, &view.outputs, &view.name, &mut connections)?;

        blocks.insert(view.name.clone(), block);
    }

    let mut graph = Graph::new(serialized.metadata.name.clone(), exec_env);
    graph.set_graph_id(serialized.metadata.id.clone());
    for (name, block) in blocks {
        graph.add_block(block).map_err(|_| GraphError::DuplicateBlockName(name))?;
    }
    for (id, conn) in connections {
        graph.insert_connection(id, conn);
    }
    Ok(graph)
}

fn build_block(id: String, name: String, kind: BlockKind) -> Block {
    match kind {
        BlockKind::BaseBlock => Block::new_base(Some(id), name),
        BlockKind::Variable => Block::new_variable(Some(id), name, Vec::new()),
        BlockKind::Code => Block::new_code(Some(id), name, String::new()),
        BlockKind::Llm => Block::new_llm(Some(id), name, String::new()),
    }
}

fn deserialize_hub_into(
    block: &mut Block,
    kind: HubKind,
    view: &HubView,
    block_name: &str,
    connections: &mut HashMap<String, Connection>,
) -> Result<()> {
    let hub = match kind {
        HubKind::Input => block.inputs_mut(),
        HubKind::Output => block.outputs_mut(),
    };

    for (port_name, port_view) in &view.ports {
        let mut port = Port::new();
        port.set_id(port_view.id.clone());
        if let Some(value) = &port_view.value {
            if port_view.reliable {
                port.cell_mut().set(value.clone());
            } else if port_view.available {
                port.cell_mut().copy_from(value.clone());
            }
        }

        for conn_id in &port_view.connections {
            port.add_connection(conn_id.clone());
            let conn = connections
                .get_mut(conn_id)
                .ok_or_else(|| GraphError::DanglingConnection(conn_id.clone()))?;
            let endpoint = PortRef {
                block_name: block_name.to_string(),
                hub: kind,
                port_name: port_name.clone(),
                port_id: port_view.id.clone(),
            };
            match kind {
                HubKind::Input => conn.set_to(endpoint),
                HubKind::Output => conn.set_from(endpoint),
            }
        }

        hub.insert_port_unchecked(port_name.clone(), port);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap as StdHashMap;

    struct NoopExecEnv;

    #[async_trait]
    impl ExecutionEnvironment for NoopExecEnv {
        async fn execute_code(
            &self,
            _source: &str,
            _inputs: &StdHashMap<String, Value>,
            _outputs: &[String],
        ) -> Result<StdHashMap<String, Value>> {
            Ok(StdHashMap::new())
        }

        async fn complete(&self, _prompt: &str, _inputs: &StdHashMap<String, Value>) -> Result<String> {
            Ok(String::new())
        }
    }

    fn exec_env() -> Arc<dyn ExecutionEnvironment> {
        Arc::new(NoopExecEnv)
    }

    #[test]
    fn scenario_6_round_trip_preserves_names_and_ids() {
        let mut g = Graph::new("demo", exec_env());
        g.add_block(Block::new_base(None, "A")).unwrap();
        g.add_block(Block::new_variable(None, "B", vec![("x".into(), json!(1))])).unwrap();
        g.block_mut("A").unwrap().outputs_mut().add_port("out").unwrap().cell_mut().set(json!(7));
        g.connect_blocks("A", "B", Some("out"), Some("x"), true).unwrap();

        let wire = serialize(&g);
        let json = wire.to_json().unwrap();
        let parsed = SerializedGraph::from_json(&json).unwrap();
        let rebuilt = deserialize(&parsed, exec_env()).unwrap();

        assert_eq!(rebuilt.id(), g.id());
        assert_eq!(rebuilt.block_names().collect::<std::collections::BTreeSet<_>>(), g.block_names().collect());
        assert_eq!(rebuilt.connection_ids().collect::<std::collections::BTreeSet<_>>(), g.connection_ids().collect());
        assert_eq!(rebuilt.block("A").unwrap().outputs().get("out").unwrap().value(), Some(&json!(7)));
    }

    #[test]
    fn stable_json_is_deterministic_and_parses_to_the_same_graph() {
        let mut g = Graph::new("demo", exec_env());
        g.add_block(Block::new_base(None, "A")).unwrap();
        g.add_block(Block::new_base(None, "B")).unwrap();
        g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();

        let wire = serialize(&g);
        let stable_a = wire.to_stable_json().unwrap();
        let stable_b = wire.to_stable_json().unwrap();
        assert_eq!(stable_a, stable_b);

        let parsed = SerializedGraph::from_json(&stable_a).unwrap();
        assert_eq!(parsed.metadata.id, wire.metadata.id);
        assert_eq!(parsed.blocks.len(), wire.blocks.len());
    }

    #[test]
    fn base64_round_trip_matches_json_round_trip() {
        let mut g = Graph::new("demo", exec_env());
        g.add_block(Block::new_base(None, "A")).unwrap();
        let wire = serialize(&g);
        let encoded = wire.to_base64().unwrap();
        let decoded = SerializedGraph::from_base64(&encoded).unwrap();
        assert_eq!(decoded.metadata.id, wire.metadata.id);
        assert_eq!(decoded.blocks.len(), wire.blocks.len());
    }

    #[test]
    fn dangling_connection_id_is_rejected() {
        let mut blocks = HashMap::new();
        let mut ports = HashMap::new();
        ports.insert(
            "out".to_string(),
            PortView {
                id: "p1".into(),
                value: None,
                available: false,
                reliable: false,
                connections: vec!["ghost".into()],
            },
        );
        blocks.insert(
            "b1".to_string(),
            BlockView {
                id: "b1".into(),
                name: "A".into(),
                description: String::new(),
                block_type: "BaseBlock".into(),
                inputs: HubView { id: "h1".into(), kind: HubKind::Input, ports: HashMap::new() },
                outputs: HubView { id: "h2".into(), kind: HubKind::Output, ports },
            },
        );
        let serialized = SerializedGraph {
            metadata: GraphMetadata { id: "g1".into(), name: "g".into() },
            blocks,
            connections: HashMap::new(),
        };
        let err = deserialize(&serialized, exec_env()).unwrap_err();
        assert!(matches!(err, GraphError::DanglingConnection(id) if id == "ghost"));
    }
}
