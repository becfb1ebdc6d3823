//! Replacing bundles of leaf-to-leaf edges with one group-to-group edge.

use crate::error::BuildError;
use crate::suffix::member_suffix;
use crate::schematic::Schematic;
use hwgraph_common::InternalError;
use hwgraph_graph::{Direction, EdgeId, Endpoint, NodeId, PortId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Edges of one node indexed by the ports they touch.
struct EdgeIndex {
    by_port: HashMap<PortId, Vec<EdgeId>>,
    removed: HashSet<EdgeId>,
}

impl EdgeIndex {
    fn add(&mut self, port: PortId, edge: EdgeId) {
        let list = self.by_port.entry(port).or_default();
        if !list.contains(&edge) {
            list.push(edge);
        }
    }

    fn detach(&mut self, edge: EdgeId, ports: &[PortId]) {
        for port in ports {
            if let Some(list) = self.by_port.get_mut(port) {
                list.retain(|&e| e != edge);
            }
        }
        self.removed.insert(edge);
    }
}

/// The far side of a bundle: the group port all members connect to.
struct FarGroup {
    node: NodeId,
    port: PortId,
    /// The leaf edges that will be replaced.
    edges: Vec<EdgeId>,
}

impl Schematic {
    /// Aggregates edges among the children of `node`, bottom-up through each
    /// child's port bundles. Returns the number of edges created.
    pub(crate) fn aggregate_in(&mut self, node: NodeId) -> Result<usize, BuildError> {
        let (children, edges) = {
            let body = &self.graph.node(node)?.body;
            (body.children().to_vec(), body.edges().to_vec())
        };
        if children.is_empty() || edges.is_empty() {
            return Ok(0);
        }
        let mut index = EdgeIndex {
            by_port: HashMap::new(),
            removed: HashSet::new(),
        };
        for &edge in &edges {
            for ep in self.graph.edge(edge)?.endpoints() {
                index.add(ep.port, edge);
            }
        }

        let mut created = 0;
        for child in children {
            let ports = self.graph.node(child)?.ports.clone();
            for port in ports {
                created += self.aggregate_port(node, child, port, &mut index)?;
            }
        }

        if !index.removed.is_empty() {
            self.graph
                .node_mut(node)?
                .body
                .edges_mut()
                .retain(|e| !index.removed.contains(e));
            for &edge in &index.removed {
                self.graph.remove_edge(edge);
            }
        }
        if created > 0 {
            self.touch(node)?;
            debug!(node = %node, created, replaced = index.removed.len(), "aggregated edges");
        }
        Ok(created)
    }

    fn aggregate_port(
        &mut self,
        node: NodeId,
        child: NodeId,
        port: PortId,
        index: &mut EdgeIndex,
    ) -> Result<usize, BuildError> {
        let members = self.graph.port(port)?.children.clone();
        let mut created = 0;
        for &member in &members {
            created += self.aggregate_port(node, child, member, index)?;
        }
        if members.is_empty() {
            return Ok(created);
        }
        let Some(far) = self.far_group(port, &members, index)? else {
            return Ok(created);
        };

        for &edge in &far.edges {
            let ports: Vec<PortId> = self.graph.edge(edge)?.endpoints().map(|ep| ep.port).collect();
            index.detach(edge, &ports);
        }

        let (name, direction) = {
            let record = self.graph.port(port)?;
            (record.name.clone(), record.direction)
        };
        let edge = self.new_edge(&name)?;
        let near = Endpoint::new(child, port);
        let far_end = Endpoint::new(far.node, far.port);
        {
            let record = self.graph.edge_mut(edge)?;
            match direction {
                Direction::Input => {
                    record.sources.push(far_end);
                    record.targets.push(near);
                }
                Direction::Output => {
                    record.sources.push(near);
                    record.targets.push(far_end);
                }
            }
        }
        self.graph.node_mut(node)?.body.edges_mut().push(edge);
        index.add(port, edge);
        index.add(far.port, edge);
        Ok(created + 1)
    }

    /// Checks whether every member of `port` has exactly one point-to-point
    /// edge, all leading to distinct members of one other group port of the
    /// same size whose names line up.
    fn far_group(
        &self,
        port: PortId,
        members: &[PortId],
        index: &EdgeIndex,
    ) -> Result<Option<FarGroup>, BuildError> {
        let group_name = &self.graph.port(port)?.name;
        let mut common: Option<(NodeId, PortId)> = None;
        let mut seen = HashSet::new();
        let mut edges = Vec::with_capacity(members.len());
        for &member in members {
            let Some(&[edge]) = index.by_port.get(&member).map(Vec::as_slice) else {
                return Ok(None);
            };
            let record = self.graph.edge(edge)?;
            if !record.is_point_to_point() {
                return Ok(None);
            }
            let far = if record.sources[0].port == member {
                record.targets[0]
            } else if record.targets[0].port == member {
                record.sources[0]
            } else {
                return Err(InternalError::new(format!("edge {edge} does not touch port {member}")).into());
            };
            let owner = self.port_owners.get(&far.port).ok_or_else(|| {
                InternalError::new(format!("port {} has no owner", far.port))
            })?;
            let Some(far_parent) = owner.parent else {
                return Ok(None);
            };
            if far_parent == port || !seen.insert(far.port) {
                return Ok(None);
            }
            match common {
                None => common = Some((far.node, far_parent)),
                Some((_, parent)) if parent != far_parent => return Ok(None),
                Some(_) => {}
            }
            let far_group_name = &self.graph.port(far_parent)?.name;
            let near_suffix = member_suffix(&self.graph.port(member)?.name, group_name);
            let far_suffix = member_suffix(&self.graph.port(far.port)?.name, far_group_name);
            if !self.comparator.suffixes_match(near_suffix, far_suffix) {
                return Ok(None);
            }
            edges.push(edge);
        }
        let Some((far_node, far_port)) = common else {
            return Ok(None);
        };
        if self.graph.port(far_port)?.children.len() != members.len() {
            return Ok(None);
        }
        Ok(Some(FarGroup {
            node: far_node,
            port: far_port,
            edges,
        }))
    }
}
