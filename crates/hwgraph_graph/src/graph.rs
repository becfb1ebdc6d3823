//! The graph container and the structural operations shared by all passes.

use crate::arena::Arena;
use crate::error::GraphError;
use crate::ids::{EdgeId, NodeId, PortId};
use crate::model::{BodyState, Edge, Node, Port, Side};
use tracing::trace;

/// Flat storage for every node, port and edge of one schematic.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arena<NodeId, Node>,
    ports: Arena<PortId, Port>,
    edges: Arena<EdgeId, Edge>,
}

/// Entity counts of a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Nodes, including the subtree root.
    pub nodes: usize,
    /// Ports, including nested group members.
    pub ports: usize,
    /// Edges, visible or hidden.
    pub edges: usize,
    /// Largest id found.
    pub max_id: u32,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node under its own id.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Stores a port under its own id.
    pub fn insert_port(&mut self, port: Port) {
        self.ports.insert(port.id, port);
    }

    /// Stores an edge under its own id.
    pub fn insert_edge(&mut self, edge: Edge) {
        self.edges.insert(edge.id, edge);
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id).ok_or(GraphError::MissingNode(id))
    }

    /// Returns the node with the given id mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(id).ok_or(GraphError::MissingNode(id))
    }

    /// Returns the port with the given id.
    pub fn port(&self, id: PortId) -> Result<&Port, GraphError> {
        self.ports.get(id).ok_or(GraphError::MissingPort(id))
    }

    /// Returns the port with the given id mutably.
    pub fn port_mut(&mut self, id: PortId) -> Result<&mut Port, GraphError> {
        self.ports.get_mut(id).ok_or(GraphError::MissingPort(id))
    }

    /// Returns the edge with the given id.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, GraphError> {
        self.edges.get(id).ok_or(GraphError::MissingEdge(id))
    }

    /// Returns the edge with the given id mutably.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, GraphError> {
        self.edges.get_mut(id).ok_or(GraphError::MissingEdge(id))
    }

    /// Removes a node record. Its ports and body are not touched.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Removes a port record.
    pub fn remove_port(&mut self, id: PortId) -> Option<Port> {
        self.ports.remove(id)
    }

    /// Removes an edge record.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.edges.remove(id)
    }

    /// All stored nodes.
    pub fn nodes(&self) -> &Arena<NodeId, Node> {
        &self.nodes
    }

    /// All stored ports.
    pub fn ports(&self) -> &Arena<PortId, Port> {
        &self.ports
    }

    /// All stored edges.
    pub fn edges(&self) -> &Arena<EdgeId, Edge> {
        &self.edges
    }

    /// Flips a node between expanded and collapsed without rebuilding anything.
    pub fn toggle_expansion(&mut self, id: NodeId) -> Result<BodyState, GraphError> {
        let node = self.node_mut(id)?;
        let state = node.body.toggle();
        trace!(node = %id, ?state, "toggled node body");
        Ok(state)
    }

    /// Finds a direct child of `parent` by display name.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, GraphError> {
        for &child in self.node(parent)?.body.children() {
            if self.node(child)?.name == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Returns `port` and every port nested below it, parents first.
    pub fn port_subtree(&self, port: PortId) -> Result<Vec<PortId>, GraphError> {
        let mut out = Vec::new();
        let mut stack = vec![port];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.port(id)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Returns all ports of a node, nested ones included, parents first.
    pub fn all_ports(&self, node: NodeId) -> Result<Vec<PortId>, GraphError> {
        let mut out = Vec::new();
        for &port in &self.node(node)?.ports {
            out.extend(self.port_subtree(port)?);
        }
        Ok(out)
    }

    /// Returns the leaf ports of a node in traversal order.
    pub fn leaf_ports(&self, node: NodeId) -> Result<Vec<PortId>, GraphError> {
        let mut leaves = Vec::new();
        for id in self.all_ports(node)? {
            if self.port(id)?.children.is_empty() {
                leaves.push(id);
            }
        }
        Ok(leaves)
    }

    /// Sets the side of `ports` and everything nested below them.
    pub fn set_side_recursive(&mut self, ports: &[PortId], side: Side) -> Result<(), GraphError> {
        for &id in ports {
            let children = {
                let port = self.port_mut(id)?;
                port.side = side;
                port.children.clone()
            };
            self.set_side_recursive(&children, side)?;
        }
        Ok(())
    }

    /// Numbers `ports` clockwise starting at `index` and returns the next free index.
    ///
    /// North and east ports are numbered before their nested ports, south and
    /// west ports after them, so the numbering follows the outline clockwise
    /// from the top-left corner at every nesting level.
    pub fn assign_port_indices(&mut self, ports: &[PortId], mut index: u32) -> Result<u32, GraphError> {
        for &id in ports {
            let (side, children) = {
                let port = self.port(id)?;
                (port.side, port.children.clone())
            };
            if side.numbers_parent_first() {
                self.port_mut(id)?.index = index;
                index = self.assign_port_indices(&children, index + 1)?;
            } else {
                index = self.assign_port_indices(&children, index)?;
                self.port_mut(id)?.index = index;
                index += 1;
            }
        }
        Ok(index)
    }

    /// Numbers the top-level ports of a node in list order, ignoring sides.
    pub fn number_ports_sequentially(&mut self, node: NodeId) -> Result<(), GraphError> {
        let ports = self.node(node)?.ports.clone();
        for (i, id) in ports.into_iter().enumerate() {
            self.port_mut(id)?.index = i as u32;
        }
        Ok(())
    }

    /// Reorders a node's top-level ports to north, east, south reversed,
    /// west reversed, then renumbers them.
    pub fn order_ports_clockwise(&mut self, node: NodeId) -> Result<(), GraphError> {
        let ports = self.node(node)?.ports.clone();
        let mut ordered = Vec::with_capacity(ports.len());
        for side in Side::CLOCKWISE {
            let mut on_side = Vec::new();
            for &id in &ports {
                if self.port(id)?.side == side {
                    on_side.push(id);
                }
            }
            if !side.numbers_parent_first() {
                on_side.reverse();
            }
            ordered.extend(on_side);
        }
        self.assign_port_indices(&ordered, 0)?;
        self.node_mut(node)?.ports = ordered;
        Ok(())
    }

    /// Counts the entities reachable from `root`, hidden internals included.
    pub fn subtree_stats(&self, root: NodeId) -> Result<GraphStats, GraphError> {
        let mut stats = GraphStats::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            stats.nodes += 1;
            stats.max_id = stats.max_id.max(id.as_raw());
            for port in self.all_ports(id)? {
                stats.ports += 1;
                stats.max_id = stats.max_id.max(port.as_raw());
            }
            for &edge in node.body.edges() {
                self.edge(edge)?;
                stats.edges += 1;
                stats.max_id = stats.max_id.max(edge.as_raw());
            }
            stack.extend(node.body.children().iter().copied());
        }
        Ok(stats)
    }
}
