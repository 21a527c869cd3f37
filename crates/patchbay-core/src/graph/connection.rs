//! Directed, typed edges between node ports.

use std::fmt;

use crate::processor::{PortDirection, PortLayout, PortType};

use super::node::NodeId;

/// A connection from an output port of one node to an input port of another.
///
/// The four-tuple `(source_node, source_port, dest_node, dest_port)` is the
/// connection's identity; a graph never holds two with the same tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Node the signal leaves.
    pub source_node: NodeId,
    /// Output port on the source node.
    pub source_port: u32,
    /// Node the signal enters.
    pub dest_node: NodeId,
    /// Input port on the destination node.
    pub dest_port: u32,
    /// Signal domain carried by the connection.
    pub port_type: PortType,
}

impl Connection {
    /// Whether this connection has the given four-tuple.
    pub fn matches(&self, source: NodeId, source_port: u32, dest: NodeId, dest_port: u32) -> bool {
        self.source_node == source
            && self.source_port == source_port
            && self.dest_node == dest
            && self.dest_port == dest_port
    }

    /// Whether either end is `node`.
    pub fn involves(&self, node: NodeId) -> bool {
        self.source_node == node || self.dest_node == node
    }

    /// Whether both ports exist and carry this connection's domain under the
    /// given endpoint layouts.
    pub fn fits(&self, source: &PortLayout, dest: &PortLayout) -> bool {
        source.port_type(PortDirection::Output, self.source_port) == Some(self.port_type)
            && dest.port_type(PortDirection::Input, self.dest_port) == Some(self.port_type)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} → {}:{} ({:?})",
            self.source_node, self.source_port, self.dest_node, self.dest_port, self.port_type
        )
    }
}
