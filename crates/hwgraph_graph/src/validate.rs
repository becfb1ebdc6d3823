//! Structural invariant checks over a built graph.
//!
//! These are run after every build in tests and, when enabled, by the
//! command-line tool before writing output.

use crate::error::GraphError;
use crate::graph::Graph;
use crate::ids::NodeId;
use std::collections::HashSet;

/// Runs every invariant check on the subtree rooted at `root`.
pub fn validate(graph: &Graph, root: NodeId) -> Result<(), GraphError> {
    check_unique_ids(graph, root)?;
    check_max_id(graph, root)?;
    check_references(graph, root)
}

/// Fails if any node, port or edge id is reachable twice from `root`.
///
/// Hidden children and edges are included, as are nested group ports.
pub fn check_unique_ids(graph: &Graph, root: NodeId) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    let mut record = |raw: u32| {
        if seen.insert(raw) {
            Ok(())
        } else {
            Err(GraphError::DuplicateId { id: raw })
        }
    };
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        record(id.as_raw())?;
        for port in graph.all_ports(id)? {
            record(port.as_raw())?;
        }
        let node = graph.node(id)?;
        for &edge in node.body.edges() {
            record(edge.as_raw())?;
        }
        stack.extend(node.body.children().iter().copied());
    }
    Ok(())
}

/// Fails if any node's `max_id` is below an id reachable inside it.
///
/// Returns the largest id found in the subtree.
pub fn check_max_id(graph: &Graph, node: NodeId) -> Result<u32, GraphError> {
    let record = graph.node(node)?;
    let mut found = node.as_raw();
    for port in graph.all_ports(node)? {
        found = found.max(port.as_raw());
    }
    for &edge in record.body.edges() {
        found = found.max(edge.as_raw());
    }
    for &child in record.body.children() {
        found = found.max(check_max_id(graph, child)?);
    }
    if record.max_id < found {
        return Err(GraphError::MaxIdTooSmall {
            node,
            max_id: record.max_id,
            found,
        });
    }
    Ok(found)
}

/// Fails if an edge points outside the node that owns it.
///
/// Every endpoint must name the owning node or one of its direct children,
/// and the port must belong to that node.
pub fn check_references(graph: &Graph, root: NodeId) -> Result<(), GraphError> {
    let mut stack = vec![root];
    while let Some(owner) = stack.pop() {
        let node = graph.node(owner)?;
        let children = node.body.children();
        for &edge_id in node.body.edges() {
            let edge = graph.edge(edge_id)?;
            for endpoint in edge.endpoints() {
                if endpoint.node != owner && !children.contains(&endpoint.node) {
                    return Err(GraphError::ForeignEndpoint {
                        edge: edge_id,
                        owner,
                        node: endpoint.node,
                    });
                }
                if !graph.all_ports(endpoint.node)?.contains(&endpoint.port) {
                    return Err(GraphError::MissingPort(endpoint.port));
                }
            }
        }
        stack.extend(children.iter().copied());
    }
    Ok(())
}
