//! Grouping of flat port lists into nested bundles by name.
//!
//! Port names are split on `_`; ports sharing a prefix end up under a group
//! port named after that prefix. A group that would hold a single port is
//! dropped and the port kept as is.

use crate::error::BuildError;
use crate::primitives::is_flip_flop;
use crate::schematic::{PortOwner, Schematic};
use hwgraph_graph::{Direction, Graph, NodeId, PortId, Side};
use indexmap::IndexMap;
use tracing::trace;

#[derive(Debug, Default)]
struct NameTrie {
    prefix: String,
    ports: Vec<PortId>,
    nested: IndexMap<String, NameTrie>,
}

impl NameTrie {
    fn build(graph: &Graph, ports: &[PortId]) -> Result<Self, BuildError> {
        let mut root = NameTrie::default();
        for &id in ports {
            let name = &graph.port(id)?.name;
            let parts: Vec<&str> = name.split('_').collect();
            let Some((_, prefixes)) = parts.split_last() else {
                continue;
            };
            if prefixes.is_empty() {
                continue;
            }
            let mut level = &mut root;
            for part in prefixes {
                level = level.nested_mut(part);
            }
            level.ports.push(id);
        }
        // Plain names join a bundle of the same name, e.g. `req` next to `req_ack`.
        for &id in ports {
            let name = &graph.port(id)?.name;
            if name.contains('_') {
                continue;
            }
            match root.nested.get_mut(name.as_str()) {
                Some(group) => group.ports.push(id),
                None => root.ports.push(id),
            }
        }
        Ok(root)
    }

    fn nested_mut(&mut self, part: &str) -> &mut NameTrie {
        let prefix = if self.prefix.is_empty() {
            part.to_string()
        } else {
            format!("{}_{part}", self.prefix)
        };
        self.nested.entry(part.to_string()).or_insert_with(|| NameTrie {
            prefix,
            ..NameTrie::default()
        })
    }

    fn leaf_count(&self) -> usize {
        self.ports.len() + self.nested.values().map(NameTrie::leaf_count).sum::<usize>()
    }

    fn first_leaf(&self) -> Option<PortId> {
        self.ports
            .first()
            .copied()
            .or_else(|| self.nested.values().find_map(NameTrie::first_leaf))
    }

    fn leaves(&self, out: &mut Vec<PortId>) {
        out.extend(&self.ports);
        for group in self.nested.values() {
            group.leaves(out);
        }
    }
}

impl Schematic {
    /// Prepares the children of a freshly built node: flip-flop pin order for
    /// operators, port bundles and edge aggregation for everything else.
    pub(crate) fn normalize_children(&mut self, node: NodeId) -> Result<(), BuildError> {
        let children = self.graph.node(node)?.body.children().to_vec();
        for child in children {
            let (operator, name) = {
                let record = self.graph.node(child)?;
                (record.is_operator(), record.name.clone())
            };
            if operator {
                if is_flip_flop(&name) {
                    self.order_flip_flop_ports(child)?;
                }
            } else {
                self.discover_port_hierarchy(child)?;
                self.aggregate_in(child)?;
            }
        }
        Ok(())
    }

    /// Moves `ARST` and then `CLK` to the end of a flip-flop's port list and
    /// renumbers it.
    pub(crate) fn order_flip_flop_ports(&mut self, node: NodeId) -> Result<(), BuildError> {
        let mut ports = self.graph.node(node)?.ports.clone();
        for pin in ["ARST", "CLK"] {
            let mut moved = Vec::new();
            let mut kept = Vec::with_capacity(ports.len());
            for id in ports {
                if self.graph.port(id)?.name == pin {
                    moved.push(id);
                } else {
                    kept.push(id);
                }
            }
            kept.extend(moved);
            ports = kept;
        }
        self.graph.node_mut(node)?.ports = ports;
        self.graph.number_ports_sequentially(node)?;
        Ok(())
    }

    /// Groups the top-level ports of `node` into bundles, settles each
    /// bundle's side and reorders the ports clockwise.
    pub(crate) fn discover_port_hierarchy(&mut self, node: NodeId) -> Result<(), BuildError> {
        let ports = self.graph.node(node)?.ports.clone();
        if ports.len() <= 1 {
            return Ok(());
        }
        let trie = NameTrie::build(&self.graph, &ports)?;
        let mut top = Vec::with_capacity(ports.len());
        self.emit_group(node, &trie, &mut top)?;
        for &port in &top {
            self.port_owners.insert(port, PortOwner { node, parent: None });
        }
        self.graph.node_mut(node)?.ports = top.clone();
        for &port in &top {
            let side = self.bundle_side(port)?;
            self.graph.set_side_recursive(&[port], side)?;
        }
        self.graph.order_ports_clockwise(node)?;
        self.touch(node)?;
        trace!(node = %node, ports = top.len(), "discovered port bundles");
        Ok(())
    }

    fn emit_group(&mut self, node: NodeId, trie: &NameTrie, out: &mut Vec<PortId>) -> Result<(), BuildError> {
        if trie.leaf_count() <= 1 {
            out.extend(trie.first_leaf());
            return Ok(());
        }
        if trie.prefix.is_empty() {
            out.extend(&trie.ports);
            for group in trie.nested.values() {
                self.emit_group(node, group, out)?;
            }
            return Ok(());
        }
        let direction = self.majority_direction(trie)?;
        let header = self.alloc_port(node, &trie.prefix, direction, out.len() as u32)?;
        let mut members = trie.ports.clone();
        for group in trie.nested.values() {
            self.emit_group(node, group, &mut members)?;
        }
        for &member in &members {
            self.port_owners.insert(
                member,
                PortOwner {
                    node,
                    parent: Some(header),
                },
            );
        }
        self.graph.port_mut(header)?.children = members;
        out.push(header);
        Ok(())
    }

    /// The direction most leaves of the bundle share; ties go to the first leaf.
    fn majority_direction(&self, trie: &NameTrie) -> Result<Direction, BuildError> {
        let mut leaves = Vec::new();
        trie.leaves(&mut leaves);
        let mut inputs = 0usize;
        for &leaf in &leaves {
            if self.graph.port(leaf)?.direction == Direction::Input {
                inputs += 1;
            }
        }
        let outputs = leaves.len() - inputs;
        Ok(match inputs.cmp(&outputs) {
            std::cmp::Ordering::Greater => Direction::Input,
            std::cmp::Ordering::Less => Direction::Output,
            std::cmp::Ordering::Equal => match trie.first_leaf() {
                Some(leaf) => self.graph.port(leaf)?.direction,
                None => Direction::Input,
            },
        })
    }

    /// The side most leaves under `port` sit on. Ties keep the port's own side
    /// if it is among the tied ones, otherwise the first in clockwise order.
    fn bundle_side(&self, port: PortId) -> Result<Side, BuildError> {
        let own = self.graph.port(port)?.side;
        if self.graph.port(port)?.children.is_empty() {
            return Ok(own);
        }
        let mut counts = [0usize; 4];
        for id in self.graph.port_subtree(port)? {
            let leaf = self.graph.port(id)?;
            if leaf.children.is_empty() {
                if let Some(slot) = Side::CLOCKWISE.iter().position(|&s| s == leaf.side) {
                    counts[slot] += 1;
                }
            }
        }
        let best = counts.iter().copied().max().unwrap_or(0);
        let tied: Vec<Side> = Side::CLOCKWISE
            .iter()
            .zip(counts)
            .filter(|&(_, count)| count == best)
            .map(|(&side, _)| side)
            .collect();
        if tied.contains(&own) {
            Ok(own)
        } else {
            Ok(tied.first().copied().unwrap_or(own))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::BuildOptions;
    use hwgraph_netlist::Netlist;
    use serde_json::json;

    fn build(ports: serde_json::Value) -> Schematic {
        let netlist: Netlist = serde_json::from_value(json!({
            "modules": {"top": {"attributes": {"top": 1}, "ports": ports}}
        }))
        .unwrap();
        Schematic::build(&netlist, &BuildOptions::default()).unwrap()
    }

    fn top(s: &Schematic) -> NodeId {
        s.graph().node(s.root()).unwrap().body.children()[0]
    }

    fn names(s: &Schematic, ports: &[PortId]) -> Vec<String> {
        ports
            .iter()
            .map(|&p| s.graph().port(p).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn bus_bits_become_one_bundle() {
        let s = build(json!({
            "DATA_0": {"direction": "input", "bits": [2]},
            "DATA_1": {"direction": "input", "bits": [3]},
            "DATA_2": {"direction": "input", "bits": [4]},
            "clk": {"direction": "input", "bits": [5]}
        }));
        let node = s.graph().node(top(&s)).unwrap();
        // West ports are listed in reverse.
        assert_eq!(names(&s, &node.ports), vec!["DATA", "clk"]);
        let header = s.graph().port(node.ports[0]).unwrap();
        assert_eq!(names(&s, &header.children), vec!["DATA_0", "DATA_1", "DATA_2"]);
        assert_eq!(header.direction, Direction::Input);
        assert_eq!(header.side, Side::West);
        for &child in &header.children {
            assert_eq!(
                s.port_owner(child).unwrap(),
                PortOwner {
                    node: node.id,
                    parent: Some(node.ports[0])
                }
            );
        }
        // Group headers are not reachable by netlist name.
        assert_eq!(s.port_by_name(node.id, "DATA"), None);
        s.validate().unwrap();
    }

    #[test]
    fn single_member_groups_are_dropped() {
        let s = build(json!({
            "rst_n": {"direction": "input", "bits": [2]},
            "q": {"direction": "output", "bits": [3]}
        }));
        let node = s.graph().node(top(&s)).unwrap();
        assert_eq!(names(&s, &node.ports), vec!["q", "rst_n"]);
        assert!(node
            .ports
            .iter()
            .all(|&p| s.graph().port(p).unwrap().children.is_empty()));
    }

    #[test]
    fn nested_bundles() {
        let s = build(json!({
            "bus_req_a": {"direction": "output", "bits": [2]},
            "bus_req_b": {"direction": "output", "bits": [3]},
            "bus_ack": {"direction": "input", "bits": [4]}
        }));
        let node = s.graph().node(top(&s)).unwrap();
        assert_eq!(names(&s, &node.ports), vec!["bus"]);
        let bus = s.graph().port(node.ports[0]).unwrap();
        assert_eq!(bus.direction, Direction::Output);
        // Two of three leaves face east, so the whole bundle does.
        assert_eq!(bus.side, Side::East);
        assert_eq!(names(&s, &bus.children), vec!["bus_ack", "bus_req"]);
        let req = s.graph().port(bus.children[1]).unwrap();
        assert_eq!(req.side, Side::East);
        assert_eq!(names(&s, &req.children), vec!["bus_req_a", "bus_req_b"]);
        s.validate().unwrap();
    }

    #[test]
    fn plain_name_joins_matching_bundle() {
        let s = build(json!({
            "req": {"direction": "input", "bits": [2]},
            "req_valid": {"direction": "input", "bits": [3]},
            "other": {"direction": "output", "bits": [4]}
        }));
        let node = s.graph().node(top(&s)).unwrap();
        assert_eq!(names(&s, &node.ports), vec!["other", "req"]);
        let req = s.graph().port(node.ports[1]).unwrap();
        assert_eq!(names(&s, &req.children), vec!["req_valid", "req"]);
    }

    #[test]
    fn clockwise_indices_with_bundles() {
        let s = build(json!({
            "in_a": {"direction": "input", "bits": [2]},
            "in_b": {"direction": "input", "bits": [3]},
            "out": {"direction": "output", "bits": [4]}
        }));
        let node = s.graph().node(top(&s)).unwrap();
        assert_eq!(names(&s, &node.ports), vec!["out", "in"]);
        let out = s.graph().port(node.ports[0]).unwrap();
        assert_eq!(out.index, 0);
        let header = s.graph().port(node.ports[1]).unwrap();
        let child_indices: Vec<u32> = header
            .children
            .iter()
            .map(|&c| s.graph().port(c).unwrap().index)
            .collect();
        // West groups number their members before themselves.
        assert_eq!(child_indices, vec![1, 2]);
        assert_eq!(header.index, 3);
    }

    #[test]
    fn flip_flop_pins_move_last() {
        let netlist: Netlist = serde_json::from_value(json!({
            "modules": {"top": {
                "attributes": {"top": 1},
                "ports": {
                    "clk": {"direction": "input", "bits": [2]},
                    "rst": {"direction": "input", "bits": [3]},
                    "d": {"direction": "input", "bits": [4]},
                    "q": {"direction": "output", "bits": [5]}
                },
                "cells": {"r": {
                    "type": "$adff",
                    "parameters": {"CLK_POLARITY": 1, "ARST_POLARITY": 1},
                    "port_directions": {"CLK": "input", "ARST": "input", "D": "input", "Q": "output"},
                    "connections": {"CLK": [2], "ARST": [3], "D": [4], "Q": [5]}
                }}
            }}
        }))
        .unwrap();
        let s = Schematic::build(&netlist, &BuildOptions::default()).unwrap();
        let ff = s.graph().node(top(&s)).unwrap().body.children()[0];
        let node = s.graph().node(ff).unwrap();
        assert_eq!(node.name, "FF_ARST_clk1_rst1");
        assert_eq!(names(&s, &node.ports), vec!["D", "Q", "ARST", "CLK"]);
        let indices: Vec<u32> = node
            .ports
            .iter()
            .map(|&p| s.graph().port(p).unwrap().index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
