//! Recursive construction of module nodes from netlist modules.

use crate::error::{BuildError, BuildWarning};
use crate::primitives::{self, CellKind, CONCAT};
use crate::resolve::{NetResolver, Role};
use crate::schematic::{NodeBuilder, Schematic};
use hwgraph_common::InternalError;
use hwgraph_graph::{Direction, Endpoint, NodeClass, NodeId, PortId};
use hwgraph_netlist::{Bit, Cell, Module, Netlist, NetlistError};
use tracing::{debug, warn};

/// Walks a netlist and fills a [`Schematic`].
///
/// Internals are built for nodes above the depth limit; nodes deeper than
/// level 1 that got internals start collapsed.
pub(crate) struct Builder<'a> {
    netlist: &'a Netlist,
    s: &'a mut Schematic,
    limit: Option<u32>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(netlist: &'a Netlist, s: &'a mut Schematic, limit: Option<u32>) -> Self {
        Self { netlist, s, limit }
    }

    fn builds_internals(&self, depth: u32) -> bool {
        self.limit.map_or(true, |limit| depth < limit)
    }

    fn collapses(&self, depth: u32) -> bool {
        depth > self.limit.unwrap_or(1)
    }

    /// Builds the root wrapper and, unless the limit is 0, the top module inside it.
    pub(crate) fn build_root(&mut self, top: Option<&str>) -> Result<NodeId, BuildError> {
        let netlist = self.netlist;
        let (top_name, _) = netlist.top_module(top)?;
        let mut record = NodeBuilder::new("root", None, 0);
        record.materialized = self.builds_internals(0);
        let root = self.s.new_node("root", NodeClass::Generic, record)?;
        if self.builds_internals(0) {
            let top_node = self.build_module(top_name, top_name, 1)?;
            self.s.discover_port_hierarchy(top_node)?;
            self.s.aggregate_in(top_node)?;
            self.s.graph.node_mut(root)?.body.children_mut().push(top_node);
        }
        self.s.seal(root, false)?;
        Ok(root)
    }

    /// Creates the node of a module instance, building its internals when
    /// the depth allows.
    fn build_module(&mut self, instance: &str, module_name: &str, depth: u32) -> Result<NodeId, BuildError> {
        let netlist = self.netlist;
        let module = netlist
            .module(module_name)
            .ok_or_else(|| NetlistError::UnknownModule(module_name.to_string()))?;
        let node = self.s.new_node(
            instance,
            NodeClass::Generic,
            NodeBuilder::new(instance, Some(module_name), depth),
        )?;
        for (name, port) in &module.ports {
            self.s
                .new_port(node, name, Some(name.as_str()), primitives::graph_direction(port.direction))?;
        }
        if self.builds_internals(depth) {
            self.load_internals(node, module_name, module, depth)?;
        }
        let collapse = self.collapses(depth);
        self.s.seal(node, collapse)?;
        debug!(node = %node, instance, module = module_name, depth, "built module node");
        Ok(node)
    }

    /// Builds the children and edges of `node` from `module`.
    pub(crate) fn load_internals(
        &mut self,
        node: NodeId,
        module_name: &str,
        module: &Module,
        depth: u32,
    ) -> Result<(), BuildError> {
        let netlist = self.netlist;
        let mut cells = Vec::with_capacity(module.cells.len());
        for (cell_name, cell) in &module.cells {
            let kind = CellKind::classify(netlist, cell);
            let child = self.build_cell(cell_name, cell, &kind, depth + 1)?;
            self.s.graph.node_mut(node)?.body.children_mut().push(child);
            cells.push((child, cell_name.as_str(), cell, kind));
        }

        let mut resolver = NetResolver::new(module_name, module);
        for (name, port) in &module.ports {
            let port_id = self.named_port(node, name)?;
            resolver.resolve(
                self.s,
                node,
                Endpoint::new(node, port_id),
                &port.bits,
                primitives::graph_direction(port.direction),
                Role::Boundary,
                Some(name.as_str()),
                depth,
            )?;
        }

        let mut blackboxes = Vec::new();
        for (child, cell_name, cell, kind) in &cells {
            match kind {
                CellKind::UnknownBlackbox { ports: None } => blackboxes.push((*child, *cell_name, *cell)),
                _ => self.connect_cell(&mut resolver, node, *child, cell_name, cell, kind, depth)?,
            }
        }
        for (child, cell_name, cell) in blackboxes {
            self.connect_blackbox(&mut resolver, node, child, cell_name, cell, depth)?;
        }

        let (edges, spans) = resolver.finish(self.s)?;
        let edge_count = edges.len();
        self.s.graph.node_mut(node)?.body.edges_mut().extend(edges);
        self.s.bit_spans.insert(node, spans);

        let folded = self.s.fold_concats(node)? + self.s.fold_slices(node)?;
        self.s.normalize_children(node)?;
        if let Some(record) = self.s.registry.get_mut(&node) {
            record.materialized = true;
        }
        debug!(
            node = %node,
            module = module_name,
            cells = cells.len(),
            edges = edge_count,
            folded,
            "loaded module internals"
        );
        Ok(())
    }

    fn named_port(&self, node: NodeId, name: &str) -> Result<PortId, BuildError> {
        self.s.port_by_name(node, name).ok_or_else(|| {
            InternalError::new(format!("node {node} has no port named '{name}'")).into()
        })
    }

    fn build_cell(
        &mut self,
        cell_name: &str,
        cell: &Cell,
        kind: &CellKind<'_>,
        depth: u32,
    ) -> Result<NodeId, BuildError> {
        match kind {
            CellKind::ModuleInstance { module } => self.build_module(cell_name, module, depth),
            CellKind::KnownPrimitive { label, ports } => {
                let node = self.s.new_node(
                    label,
                    NodeClass::Operator,
                    NodeBuilder::new(cell_name, None, depth),
                )?;
                for (name, direction) in ports.iter() {
                    let port_label = primitives::port_label(cell_name, cell, name)?;
                    self.s.new_port(
                        node,
                        &port_label,
                        Some(name.as_str()),
                        primitives::graph_direction(*direction),
                    )?;
                }
                if label == CONCAT {
                    self.s.graph.node_mut(node)?.ports.reverse();
                    self.s.graph.number_ports_sequentially(node)?;
                }
                self.s.seal(node, false)?;
                Ok(node)
            }
            CellKind::UnknownBlackbox { ports } => {
                if primitives::operator_label(cell).is_none() {
                    warn!(cell = cell_name, cell_type = %cell.cell_type, "unknown cell type");
                    self.s.warnings.push(BuildWarning::UnknownPrimitive {
                        cell: cell_name.to_string(),
                        cell_type: cell.cell_type.clone(),
                    });
                }
                let node = self.s.new_node(
                    cell_name,
                    NodeClass::Generic,
                    NodeBuilder::new(cell_name, None, depth),
                )?;
                if let Some(ports) = ports {
                    for (name, direction) in ports.iter() {
                        self.s
                            .new_port(node, name, Some(name.as_str()), primitives::graph_direction(*direction))?;
                    }
                }
                self.s.seal(node, false)?;
                Ok(node)
            }
        }
    }

    /// Resolves the connections of a cell whose ports already exist.
    ///
    /// Connection names starting with `$` are positional and bind to the
    /// child's ports in order.
    #[allow(clippy::too_many_arguments)]
    fn connect_cell(
        &mut self,
        resolver: &mut NetResolver<'_>,
        parent: NodeId,
        child: NodeId,
        cell_name: &str,
        cell: &Cell,
        kind: &CellKind<'_>,
        depth: u32,
    ) -> Result<(), BuildError> {
        let mut positional = 0;
        for (connection, bits) in &cell.connections {
            let (port, direction) = if connection.starts_with('$') {
                let port = self
                    .s
                    .graph
                    .node(child)?
                    .ports
                    .get(positional)
                    .copied()
                    .ok_or_else(|| unmatched(cell_name, connection))?;
                positional += 1;
                (port, self.s.graph.port(port)?.direction)
            } else {
                let port = self
                    .s
                    .port_by_name(child, connection)
                    .ok_or_else(|| unmatched(cell_name, connection))?;
                (port, self.connection_direction(cell_name, cell, kind, connection)?)
            };
            resolver.resolve(
                self.s,
                parent,
                Endpoint::new(child, port),
                bits,
                direction,
                Role::Cell,
                None,
                depth,
            )?;
        }
        Ok(())
    }

    fn connection_direction(
        &self,
        cell_name: &str,
        cell: &Cell,
        kind: &CellKind<'_>,
        connection: &str,
    ) -> Result<Direction, BuildError> {
        if let Some(direction) = cell
            .port_directions
            .as_ref()
            .and_then(|dirs| dirs.get(connection))
        {
            return Ok(primitives::graph_direction(*direction));
        }
        if let CellKind::ModuleInstance { module } = kind {
            if let Some(port) = self
                .netlist
                .module(module)
                .and_then(|m| m.ports.get(connection))
            {
                return Ok(primitives::graph_direction(port.direction));
            }
        }
        Err(BuildError::UnknownDirection {
            cell: cell_name.to_string(),
            connection: connection.to_string(),
        })
    }

    /// Connects a cell without declared ports, creating one port per
    /// connection on first use.
    ///
    /// A bit whose edge has no driver yet makes the port a driver; otherwise
    /// the port is driven. Runs this late so that every other port has
    /// already claimed its nets.
    fn connect_blackbox(
        &mut self,
        resolver: &mut NetResolver<'_>,
        parent: NodeId,
        child: NodeId,
        cell_name: &str,
        cell: &Cell,
        depth: u32,
    ) -> Result<(), BuildError> {
        for (connection, bits) in &cell.connections {
            let mut port: Option<PortId> = None;
            let mut i = 0;
            while i < bits.len() {
                let start = i;
                let (edge, drives) = match bits[i] {
                    Bit::Net(net) => {
                        let edge = resolver.edge_for_net(net).ok_or_else(|| BuildError::MissingEdge {
                            cell: cell_name.to_string(),
                            connection: connection.to_string(),
                            net,
                        })?;
                        i += 1;
                        (edge, self.s.graph.edge(edge)?.sources.is_empty())
                    }
                    Bit::Const(_) => {
                        let (edge, end) = resolver.const_run(self.s, parent, bits, i, depth)?;
                        i = end;
                        (edge, false)
                    }
                };
                let port = match port {
                    Some(port) => port,
                    None => {
                        let direction = if drives {
                            Direction::Output
                        } else {
                            Direction::Input
                        };
                        let created = self.s.new_port(child, connection, Some(connection.as_str()), direction)?;
                        port = Some(created);
                        created
                    }
                };
                resolver.attach(self.s, edge, Endpoint::new(child, port), drives, start, i - start)?;
            }
        }
        self.s.touch(child)?;
        Ok(())
    }
}

fn unmatched(cell: &str, connection: &str) -> BuildError {
    BuildError::UnmatchedConnection {
        cell: cell.to_string(),
        connection: connection.to_string(),
    }
}
