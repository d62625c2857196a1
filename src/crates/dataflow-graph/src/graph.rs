//! The graph: owns blocks and connections, and drives evaluation.
//!
//! Blocks and connections live in flat maps keyed by stable ids/names (the
//! "arena" approach called for in the design notes) rather than as a web of
//! `Rc<RefCell<_>>` back-pointers. Every operation that needs to reach
//! across two blocks at once — wiring a connection, cascading a reliability
//! mark, walking neighbors — is a method on `Graph`, since `Graph` is the
//! only thing holding both blocks at the same time.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::block::Block;
use crate::connection::{Connection, PortRef};
use crate::error::{GraphError, Result};
use crate::exec_env::ExecutionEnvironment;
use crate::hub::HubKind;
use crate::id;
use crate::value::Value;

/// An in-memory dataflow graph: named blocks, directed connections between
/// their ports, and the execution environment used by `Code`/`LLMBlock`
/// nodes.
pub struct Graph {
    id: String,
    name: String,
    blocks: HashMap<String, Block>,
    connections: HashMap<String, Connection>,
    exec_env: Arc<dyn ExecutionEnvironment>,
}

impl Graph {
    /// Create a new, empty graph with a fresh graph-length id.
    pub fn new(name: impl Into<String>, exec_env: Arc<dyn ExecutionEnvironment>) -> Self {
        Self {
            id: id::graph_id(),
            name: name.into(),
            blocks: HashMap::new(),
            connections: HashMap::new(),
            exec_env,
        }
    }

    /// The graph's own id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The graph's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the graph.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Overwrite the graph's id.
    ///
    /// Used only by [`crate::serialization::deserialize`], which must
    /// restore the exact id a graph held at serialization time rather than
    /// minting a fresh one.
    pub fn set_graph_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Insert an already-built connection under `id`, bypassing
    /// [`Graph::connect_blocks`]'s port-resolution path.
    ///
    /// Used only by the deserializer: by the time it calls this, the
    /// connection's endpoints have already been wired into the relevant
    /// blocks' ports directly.
    pub fn insert_connection(&mut self, id: String, connection: Connection) {
        self.connections.insert(id, connection);
    }

    /// The execution environment this graph's `Code`/`LLMBlock` nodes
    /// dispatch into.
    pub fn exec_env(&self) -> &Arc<dyn ExecutionEnvironment> {
        &self.exec_env
    }

    /// Number of blocks in the graph.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Result<&Block> {
        self.blocks.get(name).ok_or_else(|| GraphError::BlockNotFound(name.to_string()))
    }

    /// Look up a block by name, mutably.
    pub fn block_mut(&mut self, name: &str) -> Result<&mut Block> {
        self.blocks.get_mut(name).ok_or_else(|| GraphError::BlockNotFound(name.to_string()))
    }

    /// Block names, in no particular order.
    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Look up a connection by id.
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Connection ids, in no particular order.
    pub fn connection_ids(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    /// Add `block` under its own name.
    ///
    /// Fails with [`GraphError::DuplicateBlockName`] if the name is already
    /// taken.
    pub fn add_block(&mut self, block: Block) -> Result<&mut Block> {
        let name = block.name().to_string();
        if self.blocks.contains_key(&name) {
            return Err(GraphError::DuplicateBlockName(name));
        }
        self.blocks.insert(name.clone(), block);
        Ok(self.blocks.get_mut(&name).expect("just inserted"))
    }

    /// The first unused `block_k` name, starting from `block_0`.
    pub fn next_auto_block_name(&self) -> String {
        let mut k = 0usize;
        loop {
            let candidate = format!("block_{k}");
            if !self.blocks.contains_key(&candidate) {
                return candidate;
            }
            k += 1;
        }
    }

    /// Add a generic `BaseBlock` under the first free `block_k` name.
    pub fn add_auto_block(&mut self) -> &mut Block {
        let name = self.next_auto_block_name();
        let block = Block::new_base(None, name.clone());
        self.blocks.insert(name.clone(), block);
        self.blocks.get_mut(&name).expect("just inserted")
    }

    /// Remove a block by name, dropping every connection incident to it.
    ///
    /// Satisfies invariant 7: after this returns, no connection in the
    /// graph (or in any remaining block's ports) references `name`.
    pub fn remove_block(&mut self, name: &str) -> Result<Block> {
        if !self.blocks.contains_key(name) {
            return Err(GraphError::BlockNotFound(name.to_string()));
        }
        let incident: BTreeSet<String> = {
            let block = self.blocks.get(name).expect("checked above");
            block.all_connection_ids()
        };
        for conn_id in &incident {
            self.detach_connection(conn_id);
        }
        Ok(self.blocks.remove(name).expect("checked above"))
    }

    fn detach_connection(&mut self, conn_id: &str) {
        if let Some(conn) = self.connections.remove(conn_id) {
            if let Some(from) = conn.from() {
                if let Some(block) = self.blocks.get_mut(&from.block_name) {
                    if let Some(port) = block.outputs_mut().get_mut(&from.port_name) {
                        port.remove_connection(conn_id);
                    }
                }
            }
            if let Some(to) = conn.to() {
                if let Some(block) = self.blocks.get_mut(&to.block_name) {
                    if let Some(port) = block.inputs_mut().get_mut(&to.port_name) {
                        port.remove_connection(conn_id);
                    }
                }
            }
        }
    }

    /// Wire `from_name`'s output to `to_name`'s input.
    ///
    /// Resolves/creates the named ports via [`Block::connect_variable_to_variable`],
    /// then registers the resulting connection in the graph's registry.
    pub fn connect_blocks(
        &mut self,
        from_name: &str,
        to_name: &str,
        from_port: Option<&str>,
        to_port: Option<&str>,
        create_if_missing: bool,
    ) -> Result<String> {
        if from_name == to_name {
            return Err(GraphError::InvalidEndpoint(format!(
                "cannot connect block '{from_name}' to itself"
            )));
        }
        let mut from_block = self
            .blocks
            .remove(from_name)
            .ok_or_else(|| GraphError::BlockNotFound(from_name.to_string()))?;
        let mut to_block = match self.blocks.remove(to_name) {
            Some(b) => b,
            None => {
                self.blocks.insert(from_name.to_string(), from_block);
                return Err(GraphError::BlockNotFound(to_name.to_string()));
            }
        };

        let result = from_block.connect_variable_to_variable(&mut to_block, from_port, to_port, create_if_missing);

        self.blocks.insert(from_name.to_string(), from_block);
        self.blocks.insert(to_name.to_string(), to_block);

        let connection = result?;
        let conn_id = connection.id().to_string();
        self.connections.insert(conn_id.clone(), connection);
        Ok(conn_id)
    }

    /// Neighbors reachable by following one hop of incoming connections.
    pub fn incoming_neighbors(&self, name: &str) -> Result<BTreeSet<String>> {
        let block = self.block(name)?;
        Ok(block
            .incoming_connection_ids()
            .iter()
            .filter_map(|id| self.connections.get(id))
            .filter_map(|c| c.from())
            .map(|r| r.block_name.clone())
            .collect())
    }

    /// Neighbors reachable by following one hop of outgoing connections.
    pub fn outgoing_neighbors(&self, name: &str) -> Result<BTreeSet<String>> {
        let block = self.block(name)?;
        Ok(block
            .outgoing_connection_ids()
            .iter()
            .filter_map(|id| self.connections.get(id))
            .filter_map(|c| c.to())
            .map(|r| r.block_name.clone())
            .collect())
    }

    /// Neighbors in either direction.
    pub fn all_neighbors(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut set = self.incoming_neighbors(name)?;
        set.extend(self.outgoing_neighbors(name)?);
        Ok(set)
    }

    /// BFS over outgoing neighbors starting at `name`, inclusive of `name`.
    pub fn get_all_blocks_following_block(&self, name: &str) -> Result<BTreeSet<String>> {
        self.bfs(name, |g, n| g.outgoing_neighbors(n))
    }

    /// BFS over neighbors in either direction starting at `name`, inclusive.
    pub fn get_all_blocks_connected_to_block(&self, name: &str) -> Result<BTreeSet<String>> {
        self.bfs(name, |g, n| g.all_neighbors(n))
    }

    fn bfs(
        &self,
        start: &str,
        neighbors: impl Fn(&Self, &str) -> Result<BTreeSet<String>>,
    ) -> Result<BTreeSet<String>> {
        self.block(start)?;
        let mut visited = BTreeSet::new();
        visited.insert(start.to_string());
        let mut queue = VecDeque::new();
        queue.push_back(start.to_string());
        while let Some(cur) = queue.pop_front() {
            for n in neighbors(self, &cur)? {
                if visited.insert(n.clone()) {
                    queue.push_back(n);
                }
            }
        }
        Ok(visited)
    }

    /// Compute a deterministic evaluation order, optionally restricted to
    /// the subgraph reachable forward from `start`.
    ///
    /// Implemented as proper Kahn topological processing (a block only
    /// enters the queue once every in-scope predecessor has already been
    /// processed) rather than the level-assignment worklist described
    /// informally in the design notes: that version can fail to detect a
    /// cycle fed by an acyclic entry point, since it never gates a
    /// dequeue on in-degree. Gating on in-degree gives the identical
    /// level/tie-break result for any acyclic graph while making
    /// `CyclicGraph` detection exact, which is what the testable
    /// invariants require.
    pub fn get_block_evaluation_order(&self, start: Option<&str>) -> Result<Vec<String>> {
        let scope: BTreeSet<String> = match start {
            Some(s) => self.get_all_blocks_following_block(s)?,
            None => self.blocks.keys().cloned().collect(),
        };

        let mut indegree: HashMap<String, usize> = scope.iter().map(|n| (n.clone(), 0)).collect();
        for name in &scope {
            for n in self.outgoing_neighbors(name)? {
                if scope.contains(&n) {
                    *indegree.get_mut(&n).expect("in scope") += 1;
                }
            }
        }

        let mut level: HashMap<String, i64> = HashMap::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        for name in &scope {
            if indegree[name] == 0 {
                level.insert(name.clone(), 0);
                queue.push_back(name.clone());
            }
        }

        let mut remaining = indegree;
        let mut processed = 0usize;
        while let Some(cur) = queue.pop_front() {
            processed += 1;
            let lvl = level[&cur];
            for n in self.outgoing_neighbors(&cur)? {
                if !scope.contains(&n) {
                    continue;
                }
                let entry = level.entry(n.clone()).or_insert(-1);
                if lvl + 1 > *entry {
                    *entry = lvl + 1;
                }
                let rem = remaining.get_mut(&n).expect("in scope");
                *rem -= 1;
                if *rem == 0 {
                    queue.push_back(n);
                }
            }
        }

        if processed != scope.len() {
            let stuck = scope.iter().find(|n| remaining.get(*n).copied().unwrap_or(0) > 0);
            return Err(GraphError::CyclicGraph(stuck.cloned().unwrap_or_default()));
        }

        let mut pairs: Vec<(String, i64)> = level.into_iter().filter(|(n, _)| scope.contains(n)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(pairs.into_iter().map(|(n, _)| n).collect())
    }

    /// Set a port's value and apply the full propagation protocol.
    ///
    /// A no-op, by equality, if the port already holds this value. Writing
    /// to an input with `propagate` cascades `mark_outputs_unreliable_cascade`
    /// on this block. Writing to an output with `propagate` pushes the new
    /// value to each directly-connected downstream input as a propagating
    /// `set_port_value` call in its own right, so an externally-triggered
    /// edit to a computed output invalidates descendants the same way an
    /// edit to an input does — this is what makes the reliability cascade
    /// in an interactive edit (as opposed to [`Graph::push_values`]'s
    /// post-`run` bookkeeping, which intentionally does not cascade)
    /// actually reach downstream blocks' own outputs.
    pub fn set_port_value(&mut self, block_name: &str, hub: HubKind, port_name: &str, value: Value, propagate: bool) -> Result<()> {
        let changed = {
            let block = self.block_mut(block_name)?;
            let target = match hub {
                HubKind::Input => block.inputs_mut(),
                HubKind::Output => block.outputs_mut(),
            };
            let port = target
                .get_mut(port_name)
                .ok_or_else(|| GraphError::unknown_port(block_name, hub.as_str(), port_name))?;
            if port.value() == Some(&value) {
                false
            } else {
                port.cell_mut().set(value.clone());
                true
            }
        };

        if !(changed && propagate) {
            return Ok(());
        }

        match hub {
            HubKind::Input => {
                let mut visited = HashSet::new();
                self.mark_outputs_unreliable_cascade(block_name, &mut visited)?;
            }
            HubKind::Output => {
                let downstream: Vec<PortRef> = {
                    let block = self.block(block_name)?;
                    block
                        .outputs()
                        .get(port_name)
                        .into_iter()
                        .flat_map(|p| p.connections().map(str::to_string).collect::<Vec<_>>())
                        .filter_map(|id| self.connections.get(&id))
                        .filter_map(|c| c.to())
                        .cloned()
                        .collect()
                };
                for to in downstream {
                    self.set_port_value(&to.block_name, HubKind::Input, &to.port_name, value.clone(), true)?;
                }
            }
        }
        Ok(())
    }

    /// Mark every output port's cell unreliable, then recurse on every
    /// downstream block, unless this block's `changes_affect_reliability`
    /// flag opts it (and, transitively, anything only reachable through
    /// it) out of this mass-invalidate helper.
    ///
    /// This is a deliberate departure from the original `makeOutputsUnreliable`,
    /// which never checks the flag and always recurses regardless of block
    /// kind. Here, a `false` flag (currently only `Variable` blocks) stops
    /// the cascade at that block: its own outputs are left alone, and
    /// anything reachable *only* through it is never visited either. A block
    /// reachable through some other, flag-on path is still marked, because
    /// `visited` is keyed by block name rather than by traversal edge. This
    /// only matters for the narrow case of a `Variable` with its own inputs
    /// wired to something upstream; see
    /// `variable_block_truncates_cascade_to_its_sole_downstream_successor`.
    pub fn mark_outputs_unreliable_cascade(&mut self, block_name: &str, visited: &mut HashSet<String>) -> Result<()> {
        if !visited.insert(block_name.to_string()) {
            return Ok(());
        }
        let affects = self.block(block_name)?.changes_affect_reliability();
        if !affects {
            return Ok(());
        }
        self.block_mut(block_name)?.mark_own_outputs_unreliable();
        for next in self.outgoing_neighbors(block_name)? {
            self.mark_outputs_unreliable_cascade(&next, visited)?;
        }
        Ok(())
    }

    /// Copy every output port's current value to the input port(s) at the
    /// other end of each of `block_name`'s outgoing connections.
    ///
    /// Unlike [`Graph::set_port_value`], this does not skip unchanged
    /// values: its purpose is to re-establish reliability on the
    /// downstream side after a run, which must happen even if the value
    /// itself didn't change.
    pub fn push_values(&mut self, block_name: &str) -> Result<()> {
        let targets: Vec<(PortRef, Value)> = {
            let block = self.block(block_name)?;
            let mut targets = Vec::new();
            for (_, port) in block.outputs().iter() {
                let Some(value) = port.value().cloned() else { continue };
                for conn_id in port.connections() {
                    if let Some(conn) = self.connections.get(conn_id) {
                        if let Some(to) = conn.to() {
                            targets.push((to.clone(), value.clone()));
                        }
                    }
                }
            }
            targets
        };

        for (to, value) in targets {
            if let Some(block) = self.blocks.get_mut(&to.block_name) {
                if let Some(port) = block.inputs_mut().get_mut(&to.port_name) {
                    port.cell_mut().set(value);
                }
            }
        }
        Ok(())
    }

    /// Run every block in the graph in evaluation order, pushing values
    /// downstream after each successful run.
    ///
    /// An [`GraphError::ExecutionFailed`] from an individual block is
    /// recovered: the failure is logged, that block's outputs stay
    /// unreliable (already handled by the block's own `run`), and the
    /// walk continues rather than aborting the whole run.
    pub async fn run_all_blocks(&mut self) -> Result<()> {
        let order = self.get_block_evaluation_order(None)?;
        self.run_order(order).await
    }

    /// Run the subgraph reachable forward from `start`, in evaluation
    /// order, with `start` first.
    pub async fn run_all_after_block(&mut self, start: &str) -> Result<()> {
        let order = self.get_block_evaluation_order(Some(start))?;
        self.run_order(order).await
    }

    async fn run_order(&mut self, order: Vec<String>) -> Result<()> {
        let exec_env = Arc::clone(&self.exec_env);
        for name in order {
            let outcome = {
                let block = self.block_mut(&name)?;
                block.run(exec_env.as_ref()).await
            };
            match outcome {
                Ok(()) => self.push_values(&name)?,
                Err(GraphError::ExecutionFailed { block, reason }) => {
                    tracing::warn!(%block, %reason, "block execution failed, continuing run");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }
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

    fn new_graph() -> Graph {
        Graph::new("g", Arc::new(NoopExecEnv))
    }

    fn wire(g: &mut Graph, from: &str, to: &str) {
        g.connect_blocks(from, to, Some("out"), Some("in"), true).unwrap();
    }

    fn add(g: &mut Graph, name: &str) {
        g.add_block(Block::new_base(None, name)).unwrap();
    }

    #[test]
    fn scenario_1_canonical_dag_order() {
        let mut g = new_graph();
        for n in ["A", "B", "C", "D", "E", "F", "G"] {
            add(&mut g, n);
        }
        for (from, to) in [
            ("A", "B"),
            ("A", "C"),
            ("B", "D"),
            ("B", "E"),
            ("C", "E"),
            ("C", "F"),
            ("D", "G"),
            ("E", "G"),
            ("F", "G"),
        ] {
            wire(&mut g, from, to);
        }
        let order = g.get_block_evaluation_order(None).unwrap();
        assert_eq!(order, vec!["A", "B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn scenario_2_start_block_subgraph() {
        let mut g = new_graph();
        for n in ["A", "B", "C", "D", "E", "F", "G"] {
            add(&mut g, n);
        }
        for (from, to) in [
            ("A", "B"),
            ("A", "C"),
            ("B", "D"),
            ("B", "E"),
            ("C", "E"),
            ("C", "F"),
            ("D", "G"),
            ("E", "G"),
            ("F", "G"),
        ] {
            wire(&mut g, from, to);
        }
        let order = g.get_block_evaluation_order(Some("C")).unwrap();
        assert_eq!(order, vec!["C", "E", "F", "G"]);
    }

    #[test]
    fn scenario_3_auto_naming() {
        let mut g = new_graph();
        let names: Vec<String> = (0..3).map(|_| g.add_auto_block().name().to_string()).collect();
        assert_eq!(names, vec!["block_0", "block_1", "block_2"]);
    }

    #[test]
    fn scenario_4_name_collision() {
        let mut g = new_graph();
        g.add_block(Block::new_base(None, "A")).unwrap();
        let err = g.add_block(Block::new_base(None, "A")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateBlockName(n) if n == "A"));
    }

    #[test]
    fn scenario_5_reliability_cascade() {
        let mut g = new_graph();
        add(&mut g, "A");
        add(&mut g, "B");
        add(&mut g, "C");
        g.block_mut("A").unwrap().outputs_mut().add_port("out").unwrap().cell_mut().set(json!(1));
        g.block_mut("B").unwrap().inputs_mut().add_port("in").unwrap();
        g.block_mut("B").unwrap().outputs_mut().add_port("out").unwrap().cell_mut().set(json!(1));
        g.block_mut("C").unwrap().inputs_mut().add_port("in").unwrap();
        g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();
        g.connect_blocks("B", "C", Some("out"), Some("in"), true).unwrap();

        // Establish a fully reliable steady state, as if the graph had
        // already run once.
        g.block_mut("A").unwrap().outputs_mut().get_mut("out").unwrap().cell_mut().set(json!(1));
        g.push_values("A").unwrap();
        g.block_mut("B").unwrap().outputs_mut().get_mut("out").unwrap().cell_mut().set(json!(1));
        g.push_values("B").unwrap();

        g.set_port_value("A", HubKind::Output, "out", json!(2), true).unwrap();

        assert!(!g.block("B").unwrap().outputs().get("out").unwrap().cell().is_reliable());
        assert!(!g.block("C").unwrap().inputs().get("in").unwrap().cell().is_reliable());
        assert_eq!(g.block("B").unwrap().inputs().get("in").unwrap().value(), Some(&json!(2)));
    }

    #[test]
    fn variable_block_truncates_cascade_to_its_sole_downstream_successor() {
        // A -> B(Variable) -> C. B's `changes_affect_reliability` flag is
        // off, so marking A's outputs unreliable must leave both B's and
        // C's outputs alone, since C is reachable only through B.
        let mut g = new_graph();
        add(&mut g, "A");
        g.add_block(Block::new_variable(None, "B", vec![("out".to_string(), json!(1))])).unwrap();
        add(&mut g, "C");
        g.block_mut("A").unwrap().outputs_mut().add_port("out").unwrap().cell_mut().set(json!(1));
        g.block_mut("B").unwrap().inputs_mut().add_port("in").unwrap();
        g.block_mut("C").unwrap().inputs_mut().add_port("in").unwrap();
        g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();
        g.connect_blocks("B", "C", Some("out"), Some("in"), true).unwrap();

        g.block_mut("B").unwrap().outputs_mut().get_mut("out").unwrap().cell_mut().mark_reliable();
        g.block_mut("C").unwrap().inputs_mut().get_mut("in").unwrap().cell_mut().mark_reliable();

        let mut visited = HashSet::new();
        g.mark_outputs_unreliable_cascade("A", &mut visited).unwrap();

        assert!(g.block("B").unwrap().outputs().get("out").unwrap().cell().is_reliable());
        assert!(g.block("C").unwrap().inputs().get("in").unwrap().cell().is_reliable());
    }

    #[test]
    fn invariant_7_remove_block_clears_incident_connections() {
        let mut g = new_graph();
        add(&mut g, "A");
        add(&mut g, "B");
        let conn_id = g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();
        g.remove_block("A").unwrap();
        assert!(g.connection(&conn_id).is_none());
        assert!(!g.block("B").unwrap().inputs().get("in").unwrap().is_connected());
    }

    #[test]
    fn cyclic_graph_is_detected() {
        let mut g = new_graph();
        add(&mut g, "A");
        add(&mut g, "B");
        g.block_mut("A").unwrap().inputs_mut().add_port("in").unwrap();
        g.block_mut("B").unwrap().inputs_mut().add_port("in").unwrap();
        g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();
        g.connect_blocks("B", "A", Some("out"), Some("in"), true).unwrap();
        let err = g.get_block_evaluation_order(None).unwrap_err();
        assert!(matches!(err, GraphError::CyclicGraph(_)));
    }

    #[tokio::test]
    async fn run_all_blocks_pushes_values_downstream() {
        let mut g = new_graph();
        g.add_block(Block::new_variable(None, "A", vec![("out".into(), json!(41))])).unwrap();
        add(&mut g, "B");
        g.block_mut("B").unwrap().inputs_mut().add_port("in").unwrap();
        g.connect_blocks("A", "B", Some("out"), Some("in"), true).unwrap();
        g.run_all_blocks().await.unwrap();
        assert_eq!(g.block("B").unwrap().inputs().get("in").unwrap().value(), Some(&json!(41)));
        assert!(g.block("B").unwrap().inputs().get("in").unwrap().cell().is_reliable());
    }
}
