//! Structural simplification of bit-plumbing operators.
//!
//! Chains of concatenations collapse into one wide concat, and slices that
//! cut the same bus are merged into one slice with several outputs.

use crate::error::BuildError;
use crate::primitives::{CONCAT, SLICE};
use crate::schematic::Schematic;
use hwgraph_common::InternalError;
use hwgraph_graph::{Direction, EdgeId, NodeId, PortId};
use std::collections::HashSet;
use tracing::debug;

/// A concat whose only output feeds another concat.
struct ConcatLink {
    left: NodeId,
    right: NodeId,
    edge: EdgeId,
    target: PortId,
}

impl Schematic {
    /// Merges concat chains inside `node` until none is left. Returns the
    /// number of concats absorbed.
    pub(crate) fn fold_concats(&mut self, node: NodeId) -> Result<usize, BuildError> {
        let mut merged = 0;
        while let Some(link) = self.find_concat_link(node)? {
            self.merge_concats(node, &link)?;
            merged += 1;
        }
        if merged > 0 {
            debug!(node = %node, merged, "folded concat chains");
        }
        Ok(merged)
    }

    fn find_concat_link(&self, node: NodeId) -> Result<Option<ConcatLink>, BuildError> {
        let body = &self.graph.node(node)?.body;
        for &left in body.children() {
            if !self.is_operator_named(left, CONCAT)? {
                continue;
            }
            let Some(&output) = self.ports_with_direction(left, Direction::Output)?.first() else {
                continue;
            };
            let mut touching = Vec::new();
            for &edge in body.edges() {
                if self.graph.edge(edge)?.touches(output) {
                    touching.push(edge);
                }
            }
            let &[edge] = touching.as_slice() else {
                continue;
            };
            let record = self.graph.edge(edge)?;
            if record.sources.len() != 1 || record.sources[0].port != output || record.targets.len() != 1 {
                continue;
            }
            let target = record.targets[0];
            if target.node == left || !self.is_operator_named(target.node, CONCAT)? {
                continue;
            }
            return Ok(Some(ConcatLink {
                left,
                right: target.node,
                edge,
                target: target.port,
            }));
        }
        Ok(None)
    }

    fn merge_concats(&mut self, node: NodeId, link: &ConcatLink) -> Result<(), BuildError> {
        let inputs = self.ports_with_direction(link.left, Direction::Input)?;

        let right = self.graph.node_mut(link.right)?;
        let at = right.ports.iter().position(|&p| p == link.target).ok_or_else(|| {
            InternalError::new(format!("port {} is not on concat {}", link.target, link.right))
        })?;
        right.ports.splice(at..=at, inputs.iter().copied());
        for &port in &inputs {
            if let Some(owner) = self.port_owners.get_mut(&port) {
                owner.node = link.right;
            }
        }

        self.retarget_endpoints(node, link.left, link.right, &inputs)?;

        self.graph.node_mut(node)?.body.edges_mut().retain(|&e| e != link.edge);
        self.graph.remove_edge(link.edge);
        self.graph.remove_port(link.target);
        self.port_owners.remove(&link.target);
        if let Some(names) = self.port_names.get_mut(&link.right) {
            names.retain(|_, port| *port != link.target);
        }

        let left_max = self.graph.node(link.left)?.max_id;
        self.graph.node_mut(link.left)?.ports.retain(|p| !inputs.contains(p));
        self.graph.node_mut(node)?.body.children_mut().retain(|&c| c != link.left);
        self.forget_node(link.left)?;

        let right = self.graph.node_mut(link.right)?;
        right.bump_max_id(left_max);
        let ports = right.ports.clone();
        self.graph.assign_port_indices(&ports, 0)?;
        Ok(())
    }

    /// Merges slices inside `node` that cut the same bus. Returns the number
    /// of slices absorbed.
    pub(crate) fn fold_slices(&mut self, node: NodeId) -> Result<usize, BuildError> {
        let mut merged = 0;
        while let Some((canonical, absorbed)) = self.find_slice_pair(node)? {
            self.merge_slices(node, canonical, absorbed)?;
            merged += 1;
        }
        if merged > 0 {
            debug!(node = %node, merged, "folded slices");
        }
        Ok(merged)
    }

    fn find_slice_pair(&self, node: NodeId) -> Result<Option<(NodeId, NodeId)>, BuildError> {
        let edges = self.graph.node(node)?.body.edges();
        for &edge in edges {
            let mut slices: Vec<NodeId> = Vec::new();
            for target in &self.graph.edge(edge)?.targets {
                if !slices.contains(&target.node) && self.is_operator_named(target.node, SLICE)? {
                    slices.push(target.node);
                }
            }
            let Some((&canonical, rest)) = slices.split_first() else {
                continue;
            };
            let feed = self.input_edges(node, canonical)?;
            for &other in rest {
                if self.input_edges(node, other)? == feed {
                    return Ok(Some((canonical, other)));
                }
            }
        }
        Ok(None)
    }

    /// Returns the edges of `parent` that touch an input port of `node`.
    fn input_edges(&self, parent: NodeId, node: NodeId) -> Result<HashSet<EdgeId>, BuildError> {
        let inputs = self.ports_with_direction(node, Direction::Input)?;
        let mut found = HashSet::new();
        for &edge in self.graph.node(parent)?.body.edges() {
            if inputs.iter().any(|&p| self.graph.edge(edge).is_ok_and(|e| e.touches(p))) {
                found.insert(edge);
            }
        }
        Ok(found)
    }

    fn merge_slices(&mut self, node: NodeId, canonical: NodeId, absorbed: NodeId) -> Result<(), BuildError> {
        let inputs = self.ports_with_direction(absorbed, Direction::Input)?;
        let outputs = self.ports_with_direction(absorbed, Direction::Output)?;

        self.graph.node_mut(canonical)?.ports.extend(outputs.iter().copied());
        for &port in &outputs {
            if let Some(owner) = self.port_owners.get_mut(&port) {
                owner.node = canonical;
            }
        }
        self.retarget_endpoints(node, absorbed, canonical, &outputs)?;
        let edges = self.graph.node(node)?.body.edges().to_vec();
        for edge in edges {
            self.graph
                .edge_mut(edge)?
                .targets
                .retain(|ep| !(ep.node == absorbed && inputs.contains(&ep.port)));
        }

        let absorbed_max = self.graph.node(absorbed)?.max_id;
        self.graph.node_mut(absorbed)?.ports = inputs;
        self.graph.node_mut(node)?.body.children_mut().retain(|&c| c != absorbed);
        self.forget_node(absorbed)?;

        let kept = self.graph.node_mut(canonical)?;
        kept.bump_max_id(absorbed_max);
        let ports = kept.ports.clone();
        self.graph.assign_port_indices(&ports, 0)?;
        Ok(())
    }

    /// Rewrites endpoints inside `node` that address one of `ports` through
    /// `from` so they go through `to`.
    fn retarget_endpoints(
        &mut self,
        node: NodeId,
        from: NodeId,
        to: NodeId,
        ports: &[PortId],
    ) -> Result<(), BuildError> {
        let edges = self.graph.node(node)?.body.edges().to_vec();
        for edge in edges {
            let record = self.graph.edge_mut(edge)?;
            for ep in record.sources.iter_mut().chain(record.targets.iter_mut()) {
                if ep.node == from && ports.contains(&ep.port) {
                    ep.node = to;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::BuildOptions;
    use hwgraph_netlist::Netlist;
    use serde_json::json;

    fn build(doc: serde_json::Value) -> Schematic {
        let netlist: Netlist = serde_json::from_value(doc).unwrap();
        Schematic::build(&netlist, &BuildOptions::default()).unwrap()
    }

    fn top(s: &Schematic) -> NodeId {
        s.graph().node(s.root()).unwrap().body.children()[0]
    }

    fn children_named(s: &Schematic, node: NodeId, name: &str) -> Vec<NodeId> {
        s.graph()
            .node(node)
            .unwrap()
            .body
            .children()
            .iter()
            .copied()
            .filter(|&c| s.graph().node(c).unwrap().name == name)
            .collect()
    }

    #[test]
    fn concat_chain_folds_into_one() {
        // y = {c, {b, a}}
        let s = build(json!({
            "modules": {"top": {
                "attributes": {"top": 1},
                "ports": {
                    "a": {"direction": "input", "bits": [2]},
                    "b": {"direction": "input", "bits": [3]},
                    "c": {"direction": "input", "bits": [4]},
                    "y": {"direction": "output", "bits": [5, 6, 7]}
                },
                "cells": {
                    "inner": {
                        "type": "$concat",
                        "parameters": {"A_WIDTH": 1, "B_WIDTH": 1},
                        "port_directions": {"A": "input", "B": "input", "Y": "output"},
                        "connections": {"A": [2], "B": [3], "Y": [8, 9]}
                    },
                    "outer": {
                        "type": "$concat",
                        "parameters": {"A_WIDTH": 2, "B_WIDTH": 1},
                        "port_directions": {"A": "input", "B": "input", "Y": "output"},
                        "connections": {"A": [8, 9], "B": [4], "Y": [5, 6, 7]}
                    }
                },
                "netnames": {"ab": {"bits": [8, 9]}}
            }}
        }));
        let top = top(&s);
        let concats = children_named(&s, top, CONCAT);
        assert_eq!(concats.len(), 1);
        let survivor = s.graph().node(concats[0]).unwrap();
        let labels: Vec<&str> = survivor
            .ports
            .iter()
            .map(|&p| s.graph().port(p).unwrap().name.as_str())
            .collect();
        // Ports of outer are reversed (Y, B, A); A is replaced by inner's inputs.
        assert_eq!(labels, vec!["", "[2]", "[1]", "[0]"]);
        let indices: Vec<u32> = survivor
            .ports
            .iter()
            .map(|&p| s.graph().port(p).unwrap().index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        for &p in &survivor.ports {
            assert_eq!(s.port_owner(p).unwrap().node, concats[0]);
        }
        // The link edge named "ab" is gone.
        let names: Vec<&str> = s
            .graph()
            .node(top)
            .unwrap()
            .body
            .edges()
            .iter()
            .map(|&e| s.graph().edge(e).unwrap().name.as_str())
            .collect();
        assert!(!names.contains(&"ab"));
        s.validate().unwrap();
    }

    #[test]
    fn slices_of_one_bus_merge() {
        let s = build(json!({
            "modules": {"top": {
                "attributes": {"top": 1},
                "ports": {
                    "bus": {"direction": "input", "bits": [2, 3]},
                    "lo": {"direction": "output", "bits": [4]},
                    "hi": {"direction": "output", "bits": [5]}
                },
                "cells": {
                    "s0": {
                        "type": "$slice",
                        "parameters": {"OFFSET": 0, "Y_WIDTH": 1},
                        "port_directions": {"A": "input", "Y": "output"},
                        "connections": {"A": [2, 3], "Y": [4]}
                    },
                    "s1": {
                        "type": "$slice",
                        "parameters": {"OFFSET": 1, "Y_WIDTH": 1},
                        "port_directions": {"A": "input", "Y": "output"},
                        "connections": {"A": [2, 3], "Y": [5]}
                    }
                }
            }}
        }));
        let top = top(&s);
        let slices = children_named(&s, top, SLICE);
        assert_eq!(slices.len(), 1);
        let node = s.graph().node(slices[0]).unwrap();
        let labels: Vec<&str> = node
            .ports
            .iter()
            .map(|&p| s.graph().port(p).unwrap().name.as_str())
            .collect();
        assert_eq!(labels, vec!["", "[0]", "[1]"]);
        // The bus edge now has a single target.
        let bus_edges: Vec<EdgeId> = s
            .graph()
            .node(top)
            .unwrap()
            .body
            .edges()
            .iter()
            .copied()
            .filter(|&e| s.graph().edge(e).unwrap().name == "bus")
            .collect();
        assert_eq!(bus_edges.len(), 1);
        assert_eq!(s.graph().edge(bus_edges[0]).unwrap().targets.len(), 1);
        s.validate().unwrap();
    }

    #[test]
    fn slices_of_different_buses_stay_apart() {
        let s = build(json!({
            "modules": {"top": {
                "attributes": {"top": 1},
                "ports": {
                    "a": {"direction": "input", "bits": [2, 3]},
                    "b": {"direction": "input", "bits": [4, 5]},
                    "x": {"direction": "output", "bits": [6]},
                    "y": {"direction": "output", "bits": [7]}
                },
                "cells": {
                    "s0": {
                        "type": "$slice",
                        "parameters": {"OFFSET": 0, "Y_WIDTH": 1},
                        "port_directions": {"A": "input", "Y": "output"},
                        "connections": {"A": [2, 3], "Y": [6]}
                    },
                    "s1": {
                        "type": "$slice",
                        "parameters": {"OFFSET": 0, "Y_WIDTH": 1},
                        "port_directions": {"A": "input", "Y": "output"},
                        "connections": {"A": [4, 5], "Y": [7]}
                    }
                }
            }}
        }));
        let top = top(&s);
        assert_eq!(children_named(&s, top, SLICE).len(), 2);
    }
}
