//! The build session: the graph under construction plus the side tables
//! needed to keep extending it.

use crate::builder::Builder;
use crate::error::{BuildError, BuildWarning};
use crate::suffix::SuffixComparator;
use hwgraph_common::{InternalError, SuffixPolicy};
use hwgraph_graph::{
    BodyState, Direction, Edge, EdgeId, Graph, GraphError, GraphStats, IdAllocator, Node, NodeClass,
    NodeId, Port, PortId,
};
use hwgraph_netlist::Netlist;
use std::collections::HashMap;
use tracing::{debug, info};

/// Options controlling a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Deepest level whose nodes get their internals built; `None` builds
    /// everything. The root is level 0 and the top module level 1.
    pub depth_limit: Option<u32>,
    /// How leaf-port suffixes are compared during aggregation.
    pub suffix_policy: SuffixPolicy,
    /// Top module to use instead of the one carrying the `top` attribute.
    pub top: Option<String>,
}

/// Bookkeeping for one node: where it came from and whether its internals exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBuilder {
    /// Instance name in the parent module (module name for the top node).
    pub instance: String,
    /// Module definition behind the node, for module instances only.
    pub module: Option<String>,
    /// Nesting level, 0 for the root.
    pub depth: u32,
    /// Whether the node's children and edges have been built.
    pub materialized: bool,
}

impl NodeBuilder {
    pub(crate) fn new(instance: &str, module: Option<&str>, depth: u32) -> Self {
        Self {
            instance: instance.to_string(),
            module: module.map(str::to_string),
            depth,
            materialized: module.is_none(),
        }
    }
}

/// The node owning a port, and the group port it is nested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortOwner {
    /// Node whose outline the port sits on.
    pub node: NodeId,
    /// Enclosing group port, `None` for top-level ports.
    pub parent: Option<PortId>,
}

/// Whether a port drives or is driven by an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanRole {
    /// The port is one of the edge's sources.
    Source,
    /// The port is one of the edge's targets.
    Target,
}

/// A contiguous run of a connection's bits carried by one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitSpan {
    /// Port whose connection the bits belong to.
    pub port: PortId,
    /// Edge carrying the bits.
    pub edge: EdgeId,
    /// Index of the first bit within the connection.
    pub start: usize,
    /// Number of bits.
    pub width: usize,
    /// Role of the port on the edge.
    pub role: SpanRole,
}

/// A schematic graph built from a netlist.
///
/// Besides the graph the session keeps what later operations need: the id
/// allocator for on-demand expansion, per-node build records, port lookup by
/// netlist name and the owner of every port.
pub struct Schematic {
    pub(crate) graph: Graph,
    pub(crate) root: NodeId,
    pub(crate) alloc: IdAllocator,
    pub(crate) top: Option<String>,
    pub(crate) registry: HashMap<NodeId, NodeBuilder>,
    pub(crate) port_names: HashMap<NodeId, HashMap<String, PortId>>,
    pub(crate) port_owners: HashMap<PortId, PortOwner>,
    pub(crate) bit_spans: HashMap<NodeId, Vec<BitSpan>>,
    pub(crate) warnings: Vec<BuildWarning>,
    pub(crate) comparator: Box<dyn SuffixComparator>,
}

impl std::fmt::Debug for Schematic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schematic")
            .field("root", &self.root)
            .field("nodes", &self.graph.nodes().len())
            .field("ports", &self.graph.ports().len())
            .field("edges", &self.graph.edges().len())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

impl Schematic {
    /// Builds the schematic of `netlist`, comparing suffixes per `options`.
    pub fn build(netlist: &Netlist, options: &BuildOptions) -> Result<Self, BuildError> {
        Self::build_with_comparator(netlist, options, Box::new(options.suffix_policy))
    }

    /// Builds the schematic of `netlist` with a custom suffix comparator.
    ///
    /// `options.suffix_policy` is ignored.
    pub fn build_with_comparator(
        netlist: &Netlist,
        options: &BuildOptions,
        comparator: Box<dyn SuffixComparator>,
    ) -> Result<Self, BuildError> {
        let mut schematic = Schematic {
            graph: Graph::new(),
            root: NodeId::from_raw(0),
            alloc: IdAllocator::new(),
            top: options.top.clone(),
            registry: HashMap::new(),
            port_names: HashMap::new(),
            port_owners: HashMap::new(),
            bit_spans: HashMap::new(),
            warnings: Vec::new(),
            comparator,
        };
        let root = Builder::new(netlist, &mut schematic, options.depth_limit)
            .build_root(options.top.as_deref())?;
        schematic.root = root;
        let stats = schematic.stats()?;
        info!(
            nodes = stats.nodes,
            ports = stats.ports,
            edges = stats.edges,
            max_id = stats.max_id,
            "schematic built"
        );
        Ok(schematic)
    }

    /// Returns the graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the root wrapper node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the build record of a node.
    pub fn builder(&self, node: NodeId) -> Option<&NodeBuilder> {
        self.registry.get(&node)
    }

    /// Returns the warnings collected so far.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Returns the bit spans recorded while resolving the connections inside `node`.
    pub fn bit_spans(&self, node: NodeId) -> &[BitSpan] {
        self.bit_spans.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a port of `node` by its netlist port name.
    pub fn port_by_name(&self, node: NodeId, name: &str) -> Option<PortId> {
        self.port_names.get(&node)?.get(name).copied()
    }

    /// Returns the owner record of a port.
    pub fn port_owner(&self, port: PortId) -> Option<PortOwner> {
        self.port_owners.get(&port).copied()
    }

    /// Follows instance names from the root as far as the built graph goes.
    ///
    /// Returns the nodes visited, starting with the root. The last entry is
    /// the deepest node reached.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Vec<NodeId>, BuildError> {
        let mut trail = vec![self.root];
        let mut current = self.root;
        for name in path {
            match self.child_by_instance(current, name.as_ref())? {
                Some(child) => {
                    current = child;
                    trail.push(child);
                }
                None => break,
            }
        }
        Ok(trail)
    }

    fn child_by_instance(&self, parent: NodeId, instance: &str) -> Result<Option<NodeId>, BuildError> {
        for &child in self.graph.node(parent)?.body.children() {
            if self
                .registry
                .get(&child)
                .is_some_and(|b| b.instance == instance)
            {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Shows or hides the internals of `node`.
    pub fn toggle_expansion(&mut self, node: NodeId) -> Result<BodyState, GraphError> {
        let state = self.graph.toggle_expansion(node)?;
        debug!(node = %node, ?state, "toggled node");
        Ok(state)
    }

    /// Merges bundles of leaf edges inside `node` into group edges.
    ///
    /// Returns the number of edges created. Running it again on the same
    /// node creates nothing.
    pub fn aggregate_edges(&mut self, node: NodeId) -> Result<usize, BuildError> {
        self.aggregate_in(node)
    }

    /// Counts the entities reachable from the root.
    pub fn stats(&self) -> Result<GraphStats, GraphError> {
        self.graph.subtree_stats(self.root)
    }

    /// Checks id uniqueness, `maxId` bounds and edge references.
    pub fn validate(&self) -> Result<(), GraphError> {
        hwgraph_graph::validate(&self.graph, self.root)
    }

    /// Serializes the graph as layout-engine JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, GraphError> {
        hwgraph_graph::to_json_string(&self.graph, self.root, pretty)
    }

    /// Serializes the graph as a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value, GraphError> {
        hwgraph_graph::to_json_value(&self.graph, self.root)
    }

    pub(crate) fn new_node(
        &mut self,
        name: &str,
        class: NodeClass,
        record: NodeBuilder,
    ) -> Result<NodeId, BuildError> {
        let id = self.alloc.node()?;
        let mut node = Node::new(id, name);
        node.class = class;
        self.graph.insert_node(node);
        self.registry.insert(id, record);
        self.port_names.insert(id, HashMap::new());
        Ok(id)
    }

    /// Creates a top-level port on `node`, registering it under `key` if given.
    pub(crate) fn new_port(
        &mut self,
        node: NodeId,
        label: &str,
        key: Option<&str>,
        direction: Direction,
    ) -> Result<PortId, BuildError> {
        let index = self.graph.node(node)?.ports.len() as u32;
        let id = self.alloc_port(node, label, direction, index)?;
        self.graph.node_mut(node)?.ports.push(id);
        if let Some(key) = key {
            self.port_names
                .entry(node)
                .or_default()
                .insert(key.to_string(), id);
        }
        Ok(id)
    }

    /// Creates a port record owned by `node` without attaching it to the
    /// node's port list.
    pub(crate) fn alloc_port(
        &mut self,
        node: NodeId,
        label: &str,
        direction: Direction,
        index: u32,
    ) -> Result<PortId, BuildError> {
        let id = self.alloc.port()?;
        let side = crate::primitives::port_side(&self.graph.node(node)?.name, label, direction);
        self.graph.insert_port(Port {
            id,
            name: label.to_string(),
            direction,
            side,
            index,
            children: Vec::new(),
        });
        self.port_owners.insert(id, PortOwner { node, parent: None });
        self.graph.node_mut(node)?.bump_max_id(id.as_raw());
        Ok(id)
    }

    pub(crate) fn new_edge(&mut self, name: &str) -> Result<EdgeId, BuildError> {
        let id = self.alloc.edge()?;
        self.graph.insert_edge(Edge::new(id, name));
        Ok(id)
    }

    /// Creates a constant driver inside `parent` and returns it with its output port.
    pub(crate) fn new_const_node(
        &mut self,
        parent: NodeId,
        label: &str,
        depth: u32,
    ) -> Result<(NodeId, PortId), BuildError> {
        let node = self.new_node(label, NodeClass::Generic, NodeBuilder::new(label, None, depth))?;
        let port = self.new_port(node, "O0", Some("O0"), Direction::Output)?;
        self.graph.node_mut(parent)?.body.children_mut().push(node);
        Ok((node, port))
    }

    /// Raises the `maxId` of `node` to the last id handed out.
    pub(crate) fn touch(&mut self, node: NodeId) -> Result<(), BuildError> {
        if let Some(last) = self.alloc.last() {
            self.graph.node_mut(node)?.bump_max_id(last);
        }
        Ok(())
    }

    /// Finishes a node: collapses it if requested and it has internals, and
    /// updates its `maxId`.
    pub(crate) fn seal(&mut self, node: NodeId, collapse: bool) -> Result<(), BuildError> {
        self.touch(node)?;
        let record = self.graph.node_mut(node)?;
        if collapse && !record.body.is_leaf() && record.body.state() == BodyState::Expanded {
            record.body.toggle();
        }
        Ok(())
    }

    /// Drops a node and every port still attached to it.
    ///
    /// The caller removes the node from its parent's child list.
    pub(crate) fn forget_node(&mut self, node: NodeId) -> Result<(), BuildError> {
        for port in self.graph.all_ports(node)? {
            self.graph.remove_port(port);
            self.port_owners.remove(&port);
        }
        let removed = self
            .graph
            .remove_node(node)
            .ok_or(GraphError::MissingNode(node))?;
        if !removed.body.children().is_empty() {
            return Err(InternalError::new(format!("removed node {node} still had children")).into());
        }
        self.registry.remove(&node);
        self.port_names.remove(&node);
        self.bit_spans.remove(&node);
        Ok(())
    }

    /// Returns the ports of `node` with the given direction, in list order.
    pub(crate) fn ports_with_direction(
        &self,
        node: NodeId,
        direction: Direction,
    ) -> Result<Vec<PortId>, BuildError> {
        let mut found = Vec::new();
        for &port in &self.graph.node(node)?.ports {
            if self.graph.port(port)?.direction == direction {
                found.push(port);
            }
        }
        Ok(found)
    }

    /// Returns `true` if `node` is an operator with the given label.
    pub(crate) fn is_operator_named(&self, node: NodeId, label: &str) -> Result<bool, BuildError> {
        let record = self.graph.node(node)?;
        Ok(record.is_operator() && record.name == label)
    }
}
