//! Connections: directed edges from one block's output port to another
//! block's input port.
//!
//! A connection is a thin record, not an owner of the ports it links. The
//! graph's block map is the arena that actually owns ports; a connection
//! just remembers, by name, which block/hub/port pair sits on each end, so
//! it can be resolved back into a live port whenever the graph needs to
//! walk the edge.

use crate::hub::HubKind;
use crate::id;

/// Identifies a specific port inside a specific block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    /// Name of the owning block.
    pub block_name: String,
    /// Which hub the port lives on.
    pub hub: HubKind,
    /// Name of the port within that hub.
    pub port_name: String,
    /// The port's own id, used for the wire format.
    pub port_id: String,
}

/// A directed edge from an output port to an input port.
///
/// Either endpoint may be `None` transiently: during two-pass
/// deserialization a connection is created with both endpoints unresolved,
/// then each side is filled in as the owning port is reconstructed. A fully
/// built graph should never retain a connection with both endpoints `None`.
#[derive(Debug, Clone)]
pub struct Connection {
    id: String,
    from: Option<PortRef>,
    to: Option<PortRef>,
}

impl Connection {
    /// Create a new connection with a fresh id and no resolved endpoints.
    pub fn new_unresolved() -> Self {
        Self { id: id::short_id(), from: None, to: None }
    }

    /// Create a connection already wired to both endpoints.
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self { id: id::short_id(), from: Some(from), to: Some(to) }
    }

    /// The connection's own id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The source endpoint, if resolved.
    pub fn from(&self) -> Option<&PortRef> {
        self.from.as_ref()
    }

    /// The destination endpoint, if resolved.
    pub fn to(&self) -> Option<&PortRef> {
        self.to.as_ref()
    }

    /// Resolve the source endpoint.
    pub fn set_from(&mut self, endpoint: PortRef) {
        self.from = Some(endpoint);
    }

    /// Resolve the destination endpoint.
    pub fn set_to(&mut self, endpoint: PortRef) {
        self.to = Some(endpoint);
    }

    /// Whether both endpoints are resolved.
    pub fn is_fully_wired(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}
