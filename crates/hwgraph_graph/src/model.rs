//! Node, port and edge entities of the schematic graph.

use crate::ids::{EdgeId, NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal direction of a port as seen from its node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Signal flows into the node.
    Input,
    /// Signal flows out of the node.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "INPUT"),
            Direction::Output => write!(f, "OUTPUT"),
        }
    }
}

/// Side of the node outline a port is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Top edge.
    North,
    /// Right edge.
    East,
    /// Bottom edge.
    South,
    /// Left edge.
    West,
}

impl Side {
    /// All sides in clockwise order starting at the top.
    pub const CLOCKWISE: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Returns `true` for sides whose ports are numbered before their children.
    pub fn numbers_parent_first(self) -> bool {
        matches!(self, Side::North | Side::East)
    }
}

/// Rendering class of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// A plain hierarchical block.
    #[default]
    Generic,
    /// A primitive drawn with a fixed operator icon.
    Operator,
}

impl NodeClass {
    /// Returns the class string stored in `hwMeta.cls`.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::Generic => "",
            NodeClass::Operator => "Operator",
        }
    }
}

/// One end of an edge: a port and the node it is addressed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Node owning the port.
    pub node: NodeId,
    /// The port.
    pub port: PortId,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

/// A port, possibly a group header owning nested ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Globally unique id.
    pub id: PortId,
    /// Display name.
    pub name: String,
    /// Signal direction.
    pub direction: Direction,
    /// Outline side.
    pub side: Side,
    /// Clockwise placement index among the node's ports.
    pub index: u32,
    /// Nested ports of a group header.
    pub children: Vec<PortId>,
}

/// A connection between ports inside one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Globally unique id.
    pub id: EdgeId,
    /// Display name, usually the net name.
    pub name: String,
    /// Driving endpoints.
    pub sources: Vec<Endpoint>,
    /// Driven endpoints.
    pub targets: Vec<Endpoint>,
}

impl Edge {
    /// Creates an edge with no endpoints.
    pub fn new(id: EdgeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sources: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Returns `true` if exactly one source and one target are attached.
    pub fn is_point_to_point(&self) -> bool {
        self.sources.len() == 1 && self.targets.len() == 1
    }

    /// Iterates over sources then targets.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.sources.iter().chain(self.targets.iter())
    }

    /// Returns `true` if either endpoint list references `port`.
    pub fn touches(&self, port: PortId) -> bool {
        self.endpoints().any(|ep| ep.port == port)
    }
}

/// Whether a node's internals are currently shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyState {
    /// Children and edges are visible.
    Expanded,
    /// Children and edges are hidden.
    Collapsed,
}

/// Children and internal edges of a node, tagged with their visibility.
///
/// A leaf is an expanded body with both lists empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeBody {
    /// Internals are visible.
    Expanded {
        /// Child nodes.
        children: Vec<NodeId>,
        /// Internal edges.
        edges: Vec<EdgeId>,
    },
    /// Internals are hidden.
    Collapsed {
        /// Child nodes.
        children: Vec<NodeId>,
        /// Internal edges.
        edges: Vec<EdgeId>,
    },
}

impl Default for NodeBody {
    fn default() -> Self {
        NodeBody::Expanded {
            children: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl NodeBody {
    /// Returns the child nodes regardless of visibility.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeBody::Expanded { children, .. } | NodeBody::Collapsed { children, .. } => children,
        }
    }

    /// Returns the internal edges regardless of visibility.
    pub fn edges(&self) -> &[EdgeId] {
        match self {
            NodeBody::Expanded { edges, .. } | NodeBody::Collapsed { edges, .. } => edges,
        }
    }

    /// Mutable access to the child list.
    pub fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            NodeBody::Expanded { children, .. } | NodeBody::Collapsed { children, .. } => children,
        }
    }

    /// Mutable access to the edge list.
    pub fn edges_mut(&mut self) -> &mut Vec<EdgeId> {
        match self {
            NodeBody::Expanded { edges, .. } | NodeBody::Collapsed { edges, .. } => edges,
        }
    }

    /// Returns the current visibility.
    pub fn state(&self) -> BodyState {
        match self {
            NodeBody::Expanded { .. } => BodyState::Expanded,
            NodeBody::Collapsed { .. } => BodyState::Collapsed,
        }
    }

    /// Returns `true` if there are no children and no edges.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty() && self.edges().is_empty()
    }

    /// Swaps visibility in place, keeping both lists untouched.
    pub fn toggle(&mut self) -> BodyState {
        let taken = std::mem::take(self);
        *self = match taken {
            NodeBody::Expanded { children, edges } => NodeBody::Collapsed { children, edges },
            NodeBody::Collapsed { children, edges } => NodeBody::Expanded { children, edges },
        };
        self.state()
    }
}

/// A block in the schematic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique id.
    pub id: NodeId,
    /// Display name: instance name, operator label or constant literal.
    pub name: String,
    /// Rendering class.
    pub class: NodeClass,
    /// Top-level ports in placement order.
    pub ports: Vec<PortId>,
    /// Children and internal edges.
    pub body: NodeBody,
    /// Highest id reachable inside this node.
    pub max_id: u32,
}

impl Node {
    /// Creates a leaf node with no ports.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            class: NodeClass::Generic,
            ports: Vec::new(),
            body: NodeBody::default(),
            max_id: id.as_raw(),
        }
    }

    /// Returns `true` for nodes drawn as operator icons.
    pub fn is_operator(&self) -> bool {
        self.class == NodeClass::Operator
    }

    /// Raises `max_id` to at least `id`.
    pub fn bump_max_id(&mut self, id: u32) {
        self.max_id = self.max_id.max(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::from_raw).collect()
    }

    #[test]
    fn toggle_swaps_variant_and_keeps_lists() {
        let mut body = NodeBody::Expanded {
            children: ids(&[3, 5]),
            edges: vec![EdgeId::from_raw(9)],
        };
        assert_eq!(body.toggle(), BodyState::Collapsed);
        assert_eq!(body.children(), ids(&[3, 5]).as_slice());
        assert_eq!(body.edges(), &[EdgeId::from_raw(9)]);
        assert_eq!(body.toggle(), BodyState::Expanded);
        assert_eq!(body.children(), ids(&[3, 5]).as_slice());
    }

    #[test]
    fn default_body_is_expanded_leaf() {
        let body = NodeBody::default();
        assert_eq!(body.state(), BodyState::Expanded);
        assert!(body.is_leaf());
    }

    #[test]
    fn mutable_access_works_in_both_states() {
        let mut body = NodeBody::Collapsed {
            children: Vec::new(),
            edges: Vec::new(),
        };
        body.edges_mut().push(EdgeId::from_raw(1));
        body.children_mut().push(NodeId::from_raw(2));
        assert_eq!(body.state(), BodyState::Collapsed);
        assert!(!body.is_leaf());
    }

    #[test]
    fn edge_endpoint_queries() {
        let mut edge = Edge::new(EdgeId::from_raw(4), "clk");
        let a = Endpoint::new(NodeId::from_raw(1), PortId::from_raw(2));
        let b = Endpoint::new(NodeId::from_raw(5), PortId::from_raw(6));
        edge.sources.push(a);
        assert!(!edge.is_point_to_point());
        edge.targets.push(b);
        assert!(edge.is_point_to_point());
        assert!(edge.touches(PortId::from_raw(6)));
        assert!(!edge.touches(PortId::from_raw(1)));
        assert_eq!(edge.endpoints().count(), 2);
    }

    #[test]
    fn new_node_max_id_is_own_id() {
        let mut node = Node::new(NodeId::from_raw(12), "u0");
        assert_eq!(node.max_id, 12);
        node.bump_max_id(8);
        assert_eq!(node.max_id, 12);
        node.bump_max_id(20);
        assert_eq!(node.max_id, 20);
    }

    #[test]
    fn side_numbering_order() {
        assert!(Side::North.numbers_parent_first());
        assert!(Side::East.numbers_parent_first());
        assert!(!Side::South.numbers_parent_first());
        assert!(!Side::West.numbers_parent_first());
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Input).unwrap(), "\"INPUT\"");
        assert_eq!(serde_json::to_string(&Side::South).unwrap(), "\"SOUTH\"");
    }
}
