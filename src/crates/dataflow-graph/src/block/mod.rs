//! Blocks: the nodes of a dataflow graph.
//!
//! A [`Block`] is encoded as a struct with a `kind` tag plus two hubs, rather
//! than a trait object, per the design note calling for a tagged variant
//! (`BaseBlock | Variable | Code | LLM`) with a shared capability set. This
//! keeps `run` dispatch a plain `match` instead of a `dyn` call, and keeps
//! deserialization a matter of reading one tag string.

mod code;
mod llm;
mod variable;

use std::collections::BTreeSet;

use crate::connection::Connection;
use crate::error::{GraphError, Result};
use crate::exec_env::ExecutionEnvironment;
use crate::hub::{Hub, HubKind};
use crate::id;

pub use code::CODE_RESULT_PORT;
pub use code::CODE_SOURCE_PORT;
pub use llm::LLM_PROMPT_PORT;
pub use llm::LLM_RESPONSE_PORT;

/// The closed set of block specializations, tagged the way the wire format
/// names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlockKind {
    /// Generic node with no built-in behavior; `run` is a traced no-op.
    BaseBlock,
    /// Seeds its output hub with one or more named constant values.
    Variable,
    /// Dispatches its `source` port's text into the execution environment's
    /// sandboxed runner.
    Code,
    /// Formats `prompt_template` against its other inputs and dispatches to
    /// the execution environment's text-completion collaborator.
    #[serde(rename = "LLMBlock")]
    Llm,
}

impl BlockKind {
    /// The stable wire-format tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::BaseBlock => "BaseBlock",
            BlockKind::Variable => "Variable",
            BlockKind::Code => "Code",
            BlockKind::Llm => "LLMBlock",
        }
    }

    /// Parse a wire-format tag back into a [`BlockKind`].
    pub fn from_str(tag: &str) -> Option<Self> {
        match tag {
            "BaseBlock" => Some(BlockKind::BaseBlock),
            "Variable" => Some(BlockKind::Variable),
            "Code" => Some(BlockKind::Code),
            "LLMBlock" => Some(BlockKind::Llm),
            _ => None,
        }
    }
}

/// A node of the graph: identity, metadata, two hubs, and a behavior tag.
///
/// The back-pointer to the owning graph described in the data model is
/// intentionally not a field here — it's realized structurally by the fact
/// that every cross-block operation (`run_all_blocks`, neighbor queries,
/// `push_values`) is a method on [`crate::graph::Graph`] that takes a block
/// name, rather than a field a `Block` carries on itself. See `DESIGN.md`.
#[derive(Debug, Clone)]
pub struct Block {
    id: String,
    name: String,
    description: String,
    kind: BlockKind,
    inputs: Hub,
    outputs: Hub,
    changes_affect_reliability: bool,
}

impl Block {
    fn new(id: Option<String>, name: impl Into<String>, kind: BlockKind, inputs_editable: bool, outputs_editable: bool) -> Self {
        Self {
            id: id.unwrap_or_else(id::short_id),
            name: name.into(),
            description: String::new(),
            kind,
            inputs: Hub::new(HubKind::Input, inputs_editable),
            outputs: Hub::new(HubKind::Output, outputs_editable),
            changes_affect_reliability: true,
        }
    }

    /// Build a generic `BaseBlock` with empty, fully editable hubs.
    pub fn new_base(id: Option<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, BlockKind::BaseBlock, true, true)
    }

    /// Build a `Variable` block seeded with the given named values.
    ///
    /// See [`variable::build`] for the seeding behavior and the adopted
    /// reliability rule.
    pub fn new_variable(id: Option<String>, name: impl Into<String>, values: Vec<(String, crate::value::Value)>) -> Self {
        variable::build(id, name, values)
    }

    /// Build a `Code` block with the fixed `result` output port and a
    /// `source` input port seeded with `source_text`.
    pub fn new_code(id: Option<String>, name: impl Into<String>, source_text: impl Into<String>) -> Self {
        code::build(id, name, source_text)
    }

    /// Build an `LLMBlock` with the fixed `response` output port and a
    /// `prompt_template` input port seeded with `template`.
    pub fn new_llm(id: Option<String>, name: impl Into<String>, template: impl Into<String>) -> Self {
        llm::build(id, name, template)
    }

    /// The block's own id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The block's name, unique within whatever graph owns it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the block. Graph-level callers are responsible for keeping
    /// the block map's key in sync; this only updates the block's own
    /// record of its name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Free-form human description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the free-form description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Which specialization this block is.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Whether this block participates in the block-level mass-invalidate
    /// helper ([`crate::graph::Graph::mark_outputs_unreliable_cascade`]).
    pub fn changes_affect_reliability(&self) -> bool {
        self.changes_affect_reliability
    }

    /// The input hub.
    pub fn inputs(&self) -> &Hub {
        &self.inputs
    }

    /// The input hub, mutably.
    pub fn inputs_mut(&mut self) -> &mut Hub {
        &mut self.inputs
    }

    /// The output hub.
    pub fn outputs(&self) -> &Hub {
        &self.outputs
    }

    /// The output hub, mutably.
    pub fn outputs_mut(&mut self) -> &mut Hub {
        &mut self.outputs
    }

    /// Add a port to the input hub. Delegates to [`Hub::add_port_auto`].
    pub fn add_input_port(&mut self, name: Option<&str>, connection: Option<&str>) -> Result<&str> {
        self.inputs.add_port_auto(name, connection)
    }

    /// Add a port to the output hub. Delegates to [`Hub::add_port_auto`].
    pub fn add_output_port(&mut self, name: Option<&str>, connection: Option<&str>) -> Result<&str> {
        self.outputs.add_port_auto(name, connection)
    }

    /// Rename one of this block's output ports — the `Variable` block's
    /// notion of renaming a variable, delegating to the output hub.
    pub fn rename_variable(&mut self, old_name: &str, new_name: &str) -> Result<bool> {
        self.outputs.rename_port(old_name, new_name)
    }

    /// Remove every output port — the `Variable` block's `clearAllVariables`.
    pub fn clear_all_variables(&mut self) -> Result<()> {
        self.outputs.clear_all_ports()
    }

    fn hub(&self, kind: HubKind) -> &Hub {
        match kind {
            HubKind::Input => &self.inputs,
            HubKind::Output => &self.outputs,
        }
    }

    fn hub_mut(&mut self, kind: HubKind) -> &mut Hub {
        match kind {
            HubKind::Input => &mut self.inputs,
            HubKind::Output => &mut self.outputs,
        }
    }

    /// Ids of every connection touching the input hub.
    pub fn incoming_connection_ids(&self) -> BTreeSet<String> {
        self.inputs.iter().flat_map(|(_, p)| p.connections().map(str::to_string)).collect()
    }

    /// Ids of every connection touching the output hub.
    pub fn outgoing_connection_ids(&self) -> BTreeSet<String> {
        self.outputs.iter().flat_map(|(_, p)| p.connections().map(str::to_string)).collect()
    }

    /// Ids of every connection touching either hub.
    pub fn all_connection_ids(&self) -> BTreeSet<String> {
        self.incoming_connection_ids().into_iter().chain(self.outgoing_connection_ids()).collect()
    }

    /// Mark every output port's cell unreliable, without recursing to
    /// downstream blocks. The recursive cascade lives on [`crate::graph::Graph`],
    /// which is the only thing with enough context to find "downstream".
    pub fn mark_own_outputs_unreliable(&mut self) {
        for name in self.outputs.names().map(str::to_string).collect::<Vec<_>>() {
            if let Some(port) = self.outputs.get_mut(&name) {
                port.cell_mut().mark_unreliable();
            }
        }
    }

    /// Resolve (or create) a named output port on `self` and a named input
    /// port on `other`, wire a connection between them, and return it.
    ///
    /// When `from_name`/`to_name` are `None`, a fresh auto-named port is
    /// created on the relevant hub (mirroring [`Hub::add_port`]'s own
    /// behavior for an absent name) rather than reusing an existing one.
    pub fn connect_variable_to_variable(
        &mut self,
        other: &mut Block,
        from_name: Option<&str>,
        to_name: Option<&str>,
        create_if_missing: bool,
    ) -> Result<Connection> {
        let from = resolve_port(&mut self.outputs, from_name, create_if_missing, &self.name, "outputs")?;
        let to = resolve_port(&mut other.inputs, to_name, create_if_missing, &other.name, "inputs")?;

        let from_port_id = self.outputs.get(&from).expect("just resolved").id().to_string();
        let to_port_id = other.inputs.get(&to).expect("just resolved").id().to_string();

        let from_ref = crate::connection::PortRef {
            block_name: self.name.clone(),
            hub: HubKind::Output,
            port_name: from.clone(),
            port_id: from_port_id,
        };
        let to_ref = crate::connection::PortRef {
            block_name: other.name.clone(),
            hub: HubKind::Input,
            port_name: to.clone(),
            port_id: to_port_id,
        };

        let connection = Connection::new(from_ref, to_ref);

        let current_value = self.outputs.get(&from).and_then(|p| p.value()).cloned();

        self.outputs.get_mut(&from).expect("just resolved").add_connection(connection.id());

        let to_port = other.inputs.get_mut(&to).expect("just resolved");
        to_port.add_connection(connection.id());
        to_port.cell_mut().mark_unreliable();
        if let Some(v) = current_value {
            to_port.cell_mut().copy_from(v);
        }

        Ok(connection)
    }

    /// Run this block's own behavior: read inputs, compute, write outputs.
    ///
    /// Does not push values to downstream blocks — that cross-block step is
    /// [`crate::graph::Graph::push_values`], invoked by the graph's run
    /// drivers right after this returns successfully.
    pub async fn run(&mut self, exec_env: &dyn ExecutionEnvironment) -> Result<()> {
        match self.kind {
            BlockKind::BaseBlock | BlockKind::Variable => {
                tracing::trace!(block = %self.name, kind = ?self.kind, "run: no-op");
                Ok(())
            }
            BlockKind::Code => code::run(self, exec_env).await,
            BlockKind::Llm => llm::run(self, exec_env).await,
        }
    }
}

fn resolve_port(hub: &mut Hub, name: Option<&str>, create_if_missing: bool, block_name: &str, hub_label: &str) -> Result<String> {
    match name {
        None => Ok(hub.add_port_auto(None, None)?.to_string()),
        Some(name) => {
            if hub.contains(name) {
                Ok(name.to_string())
            } else if create_if_missing {
                hub.add_port_auto(Some(name), None)?;
                Ok(name.to_string())
            } else {
                Err(GraphError::unknown_port(block_name, hub_label, name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_block_has_empty_editable_hubs() {
        let block = Block::new_base(None, "A");
        assert_eq!(block.kind(), BlockKind::BaseBlock);
        assert!(block.inputs().is_editable());
        assert!(block.outputs().is_editable());
        assert!(block.inputs().is_empty());
    }

    #[test]
    fn connect_variable_to_variable_creates_and_wires_ports() {
        let mut a = Block::new_base(None, "A");
        let mut b = Block::new_base(None, "B");
        a.outputs_mut().add_port("out1").unwrap().cell_mut().set(json!(5));

        let conn = a.connect_variable_to_variable(&mut b, Some("out1"), Some("in1"), true).unwrap();

        assert!(a.outputs().get("out1").unwrap().is_connected());
        assert!(b.inputs().get("in1").unwrap().is_connected());
        assert_eq!(conn.from().unwrap().port_name, "out1");
        assert_eq!(conn.to().unwrap().port_name, "in1");
        // copied for display, but left unreliable since addConnection already marked it so
        assert_eq!(b.inputs().get("in1").unwrap().value(), Some(&json!(5)));
        assert!(!b.inputs().get("in1").unwrap().cell().is_reliable());
    }

    #[test]
    fn connect_variable_to_variable_rejects_missing_port_when_not_creating() {
        let mut a = Block::new_base(None, "A");
        let mut b = Block::new_base(None, "B");
        let err = a.connect_variable_to_variable(&mut b, Some("nope"), Some("in1"), false).unwrap_err();
        assert!(matches!(err, GraphError::UnknownPortName { .. }));
    }

    #[test]
    fn mark_own_outputs_unreliable_does_not_touch_inputs() {
        let mut block = Block::new_base(None, "A");
        block.outputs_mut().add_port("o").unwrap().cell_mut().set(json!(1));
        block.inputs_mut().add_port("i").unwrap().cell_mut().set(json!(2));
        block.mark_own_outputs_unreliable();
        assert!(!block.outputs().get("o").unwrap().cell().is_reliable());
        assert!(block.inputs().get("i").unwrap().cell().is_reliable());
    }

    #[test]
    fn add_input_and_output_port_delegate_to_the_matching_hub() {
        let mut block = Block::new_base(None, "A");
        let name = block.add_input_port(Some("in1"), None).unwrap().to_string();
        assert_eq!(name, "in1");
        assert!(block.inputs().contains("in1"));
        assert!(!block.outputs().contains("in1"));

        let auto = block.add_output_port(None, None).unwrap().to_string();
        assert_eq!(auto, "var1");
        assert!(block.outputs().contains("var1"));
    }

    #[test]
    fn rename_variable_renames_an_output_port() {
        let mut block = Block::new_base(None, "A");
        block.outputs_mut().add_port("old").unwrap().cell_mut().set(json!(7));
        assert!(block.rename_variable("old", "new").unwrap());
        assert!(!block.outputs().contains("old"));
        assert_eq!(block.outputs().get("new").unwrap().value(), Some(&json!(7)));
    }

    #[test]
    fn clear_all_variables_empties_the_output_hub() {
        let mut block = Block::new_base(None, "A");
        block.outputs_mut().add_port("a").unwrap();
        block.outputs_mut().add_port("b").unwrap();
        block.clear_all_variables().unwrap();
        assert!(block.outputs().is_empty());
        assert!(!block.outputs().contains("a"));
    }
}
