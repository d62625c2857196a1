//! Hubs: the ordered, named collections of ports on each side of a block.
//!
//! Every block has exactly two hubs, an input hub and an output hub. Hubs
//! preserve insertion order for their ports (matching the original's use of
//! an ordered dict) because evaluation-order tie-breaking and serialized
//! views both want a stable, human-meaningful port order rather than
//! whatever a hash map would give us.

use std::collections::{BTreeSet, HashMap};

use crate::error::{GraphError, Result};
use crate::id;
use crate::port::Port;

/// Which side of a block a hub sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubKind {
    /// Values flow into the block through this hub.
    Input,
    /// Values flow out of the block through this hub.
    Output,
}

impl HubKind {
    /// Human-readable name used in error messages and wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            HubKind::Input => "inputs",
            HubKind::Output => "outputs",
        }
    }
}

impl std::fmt::Display for HubKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, named collection of ports.
#[derive(Debug, Clone)]
pub struct Hub {
    id: String,
    kind: HubKind,
    order: Vec<String>,
    ports: HashMap<String, Port>,
    editable: bool,
}

impl Hub {
    /// Create a new, empty hub of the given kind.
    ///
    /// `editable` controls whether [`Hub::add_port`] and [`Hub::remove_port`]
    /// are allowed after construction; block kinds with a fixed port layout
    /// (Code, LLM) freeze their hubs once built.
    pub fn new(kind: HubKind, editable: bool) -> Self {
        Self { id: id::short_id(), kind, order: Vec::new(), ports: HashMap::new(), editable }
    }

    /// The hub's own id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Which side of the block this hub represents.
    pub fn kind(&self) -> HubKind {
        self.kind
    }

    /// Whether ports may currently be added to or removed from this hub.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Freeze or unfreeze this hub's port set.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Port names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of ports on this hub.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no port on this hub holds any connection.
    ///
    /// Not "has zero ports" — a hub with ports that are all unconnected
    /// still reports `true`.
    pub fn is_empty(&self) -> bool {
        self.get_connections().is_empty()
    }

    /// Whether a port with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    /// Look up a port by name.
    pub fn get(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    /// Look up a port by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.ports.get_mut(name)
    }

    /// Iterate over `(name, port)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Port)> {
        self.order.iter().map(move |name| (name.as_str(), &self.ports[name]))
    }

    /// Add a fresh, empty port under `name`.
    ///
    /// Fails with [`GraphError::HubNotEditable`] if the hub is frozen, or
    /// [`GraphError::DuplicatePortName`] if the name is already taken.
    pub fn add_port(&mut self, name: impl Into<String>) -> Result<&mut Port> {
        if !self.editable {
            return Err(GraphError::HubNotEditable);
        }
        let name = name.into();
        if self.ports.contains_key(&name) {
            return Err(GraphError::DuplicatePortName(name));
        }
        self.order.push(name.clone());
        self.ports.insert(name.clone(), Port::new());
        Ok(self.ports.get_mut(&name).expect("just inserted"))
    }

    /// Insert a port under `name`, bypassing the editable check.
    ///
    /// Used by the deserializer, which must be able to reconstruct even
    /// non-editable hubs (Code, LLM) from a serialized document.
    pub fn insert_port_unchecked(&mut self, name: impl Into<String>, port: Port) {
        let name = name.into();
        if !self.ports.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.ports.insert(name, port);
    }

    /// Remove a port by name.
    ///
    /// Fails with [`GraphError::HubNotEditable`] if the hub is frozen, or
    /// [`GraphError::UnknownPortName`]-shaped caller error if absent (the
    /// caller supplies block/hub context for that case, so this returns a
    /// plain bool instead).
    pub fn remove_port(&mut self, name: &str) -> Result<bool> {
        if !self.editable {
            return Err(GraphError::HubNotEditable);
        }
        if self.ports.remove(name).is_some() {
            self.order.retain(|n| n != name);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// The hub's full `addPort(name?, connection?)` contract: auto-generate
    /// `var{1+numPorts}` (skipping collisions) when `name` is absent, and
    /// wire `connection` into the freshly created port when supplied.
    /// Returns the final port name.
    ///
    /// Wiring a connection in means registering its id against the new
    /// port and, when this is an input hub, marking the port's cell
    /// unreliable — a fresh inbound edge invalidates any prior value the
    /// same way [`crate::graph::Graph::connect_blocks`] does for an
    /// existing port, mirroring the hub-orientation-dependent wiring the
    /// original `ConnectionHub._setConnectionPort` performs.
    pub fn add_port_auto(&mut self, name: Option<&str>, connection: Option<&str>) -> Result<&str> {
        if !self.editable {
            return Err(GraphError::HubNotEditable);
        }
        let name = match name {
            Some(name) => {
                if self.ports.contains_key(name) {
                    return Err(GraphError::DuplicatePortName(name.to_string()));
                }
                name.to_string()
            }
            None => self.next_auto_port_name(),
        };

        let mut port = Port::new();
        if let Some(connection_id) = connection {
            port.add_connection(connection_id);
            if self.kind == HubKind::Input {
                port.cell_mut().mark_unreliable();
            }
        }
        self.order.push(name.clone());
        self.ports.insert(name.clone(), port);
        Ok(self.order.last().expect("just pushed"))
    }

    /// Generate the next free `var{n}` name for this hub, skipping
    /// collisions, without creating a port.
    fn next_auto_port_name(&self) -> String {
        let mut n = 1 + self.len();
        loop {
            let candidate = format!("var{n}");
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Rename a port, preserving its identity (id, value, connections).
    ///
    /// Fails with [`GraphError::DuplicatePortName`] if `new` already
    /// exists, or [`GraphError::HubNotEditable`] if the hub is frozen.
    /// Returns `false` rather than erroring if `old` doesn't exist, the
    /// same "caller supplies context" convention [`Hub::remove_port`]
    /// uses.
    pub fn rename_port(&mut self, old: &str, new: &str) -> Result<bool> {
        if !self.editable {
            return Err(GraphError::HubNotEditable);
        }
        if self.ports.contains_key(new) {
            return Err(GraphError::DuplicatePortName(new.to_string()));
        }
        let Some(port) = self.ports.remove(old) else {
            return Ok(false);
        };
        if let Some(slot) = self.order.iter_mut().find(|n| n.as_str() == old) {
            *slot = new.to_string();
        }
        self.ports.insert(new.to_string(), port);
        Ok(true)
    }

    /// Remove every port on this hub, equivalent to calling
    /// [`Hub::remove_port`] over the current name list.
    pub fn clear_all_ports(&mut self) -> Result<()> {
        if !self.editable {
            return Err(GraphError::HubNotEditable);
        }
        self.ports.clear();
        self.order.clear();
        Ok(())
    }

    /// Union of every port's connection set.
    pub fn get_connections(&self) -> BTreeSet<String> {
        self.ports.values().flat_map(|p| p.connections().map(str::to_string)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_port_preserves_insertion_order() {
        let mut hub = Hub::new(HubKind::Input, true);
        hub.add_port("b").unwrap();
        hub.add_port("a").unwrap();
        hub.add_port("c").unwrap();
        assert_eq!(hub.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_port_name_is_rejected() {
        let mut hub = Hub::new(HubKind::Input, true);
        hub.add_port("x").unwrap();
        let err = hub.add_port("x").unwrap_err();
        assert!(matches!(err, GraphError::DuplicatePortName(name) if name == "x"));
    }

    #[test]
    fn frozen_hub_rejects_add_and_remove() {
        let mut hub = Hub::new(HubKind::Output, false);
        assert!(matches!(hub.add_port("x"), Err(GraphError::HubNotEditable)));
        assert!(matches!(hub.remove_port("x"), Err(GraphError::HubNotEditable)));
    }

    #[test]
    fn remove_port_updates_order() {
        let mut hub = Hub::new(HubKind::Input, true);
        hub.add_port("a").unwrap();
        hub.add_port("b").unwrap();
        assert!(hub.remove_port("a").unwrap());
        assert_eq!(hub.names().collect::<Vec<_>>(), vec!["b"]);
        assert!(!hub.contains("a"));
    }

    #[test]
    fn is_empty_reflects_connections_not_port_count() {
        let mut hub = Hub::new(HubKind::Input, true);
        assert!(hub.is_empty());
        hub.add_port("a").unwrap();
        assert!(hub.is_empty(), "an unconnected port must still count as empty");
        hub.get_mut("a").unwrap().add_connection("c1");
        assert!(!hub.is_empty());
    }

    #[test]
    fn add_port_auto_generates_name_when_absent() {
        let mut hub = Hub::new(HubKind::Output, true);
        hub.add_port("var1").unwrap();
        let name = hub.add_port_auto(None, None).unwrap().to_string();
        assert_eq!(name, "var2");
        assert!(hub.contains("var2"));
    }

    #[test]
    fn add_port_auto_wires_the_given_connection_on_either_orientation() {
        let mut input_hub = Hub::new(HubKind::Input, true);
        let name = input_hub.add_port_auto(Some("in"), Some("c1")).unwrap().to_string();
        let port = input_hub.get(&name).unwrap();
        assert!(port.is_connected());
        assert_eq!(port.connections().collect::<Vec<_>>(), vec!["c1"]);

        let mut output_hub = Hub::new(HubKind::Output, true);
        let name = output_hub.add_port_auto(Some("out"), Some("c1")).unwrap().to_string();
        let port = output_hub.get(&name).unwrap();
        assert!(port.is_connected());
    }

    #[test]
    fn add_port_auto_with_no_connection_leaves_port_unconnected() {
        let mut hub = Hub::new(HubKind::Output, true);
        let name = hub.add_port_auto(Some("out"), None).unwrap().to_string();
        assert!(!hub.get(&name).unwrap().is_connected());
    }

    #[test]
    fn rename_port_preserves_value_and_rejects_collisions() {
        let mut hub = Hub::new(HubKind::Output, true);
        hub.add_port("old").unwrap().cell_mut().set(serde_json::json!(1));
        hub.add_port("taken").unwrap();

        assert!(matches!(hub.rename_port("old", "taken"), Err(GraphError::DuplicatePortName(n)) if n == "taken"));
        assert!(!hub.rename_port("missing", "new").unwrap());

        assert!(hub.rename_port("old", "new").unwrap());
        assert!(!hub.contains("old"));
        assert_eq!(hub.get("new").unwrap().value(), Some(&serde_json::json!(1)));
        assert_eq!(hub.names().collect::<Vec<_>>(), vec!["new", "taken"]);
    }

    #[test]
    fn clear_all_ports_removes_everything() {
        let mut hub = Hub::new(HubKind::Output, true);
        hub.add_port("a").unwrap();
        hub.add_port("b").unwrap();
        hub.clear_all_ports().unwrap();
        assert!(hub.is_empty());
        assert_eq!(hub.len(), 0);
    }

    #[test]
    fn get_connections_unions_every_port() {
        let mut hub = Hub::new(HubKind::Output, true);
        hub.add_port("a").unwrap().add_connection("c1");
        hub.add_port("b").unwrap().add_connection("c2");
        let conns = hub.get_connections();
        assert_eq!(conns, BTreeSet::from(["c1".to_string(), "c2".to_string()]));
    }

    #[test]
    fn frozen_hub_rejects_rename_and_clear() {
        let mut hub = Hub::new(HubKind::Output, false);
        assert!(matches!(hub.rename_port("a", "b"), Err(GraphError::HubNotEditable)));
        assert!(matches!(hub.clear_all_ports(), Err(GraphError::HubNotEditable)));
    }
}
