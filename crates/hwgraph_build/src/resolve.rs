//! Turning connection bit vectors into edges.
//!
//! Every distinct net inside a module becomes one edge, and every run of
//! adjacent constant bits becomes an edge driven by its own constant node.
//! Endpoints are attached as sources or targets depending on which side of
//! the module boundary the port sits on.

use crate::error::BuildError;
use crate::schematic::{BitSpan, Schematic, SpanRole};
use hwgraph_common::Logic;
use hwgraph_graph::{Direction, EdgeId, Endpoint, NodeId};
use hwgraph_netlist::{Bit, Module, NetNameIndex};
use std::collections::HashMap;
use tracing::trace;

/// Which side of a module boundary a connection belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    /// A port of the module being built, seen from inside.
    Boundary,
    /// A port of a cell inside the module.
    Cell,
}

impl Role {
    /// Boundary inputs and cell outputs drive the net.
    fn drives(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Role::Boundary, Direction::Input) | (Role::Cell, Direction::Output)
        )
    }
}

/// Edge table for the module currently being built.
pub(crate) struct NetResolver<'n> {
    module: &'n str,
    names: NetNameIndex<'n>,
    by_net: HashMap<u64, EdgeId>,
    order: Vec<EdgeId>,
    spans: Vec<BitSpan>,
}

impl<'n> NetResolver<'n> {
    pub(crate) fn new(module_name: &'n str, module: &'n Module) -> Self {
        Self {
            module: module_name,
            names: NetNameIndex::new(module),
            by_net: HashMap::new(),
            order: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Attaches `at` to the edges of every bit in `bits`.
    ///
    /// Boundary edges are named after `boundary_name`; cell edges after the
    /// net name, which must exist.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn resolve(
        &mut self,
        s: &mut Schematic,
        parent: NodeId,
        at: Endpoint,
        bits: &[Bit],
        direction: Direction,
        role: Role,
        boundary_name: Option<&str>,
        depth: u32,
    ) -> Result<(), BuildError> {
        let drives = role.drives(direction);
        let mut i = 0;
        while i < bits.len() {
            let start = i;
            let edge = match bits[i] {
                Bit::Net(net) => {
                    i += 1;
                    self.edge_for_net_or_new(s, net, boundary_name)?
                }
                Bit::Const(_) => {
                    let (edge, end) = self.const_run(s, parent, bits, i, depth)?;
                    i = end;
                    edge
                }
            };
            self.attach(s, edge, at, drives, start, i - start)?;
        }
        Ok(())
    }

    fn edge_for_net_or_new(
        &mut self,
        s: &mut Schematic,
        net: u64,
        boundary_name: Option<&str>,
    ) -> Result<EdgeId, BuildError> {
        if let Some(&edge) = self.by_net.get(&net) {
            return Ok(edge);
        }
        let name = boundary_name
            .or_else(|| self.names.name_of(net))
            .ok_or_else(|| BuildError::UndeclaredNet {
                module: self.module.to_string(),
                net,
            })?;
        let edge = s.new_edge(name)?;
        trace!(net, edge = %edge, name, "new net edge");
        self.by_net.insert(net, edge);
        self.order.push(edge);
        Ok(edge)
    }

    /// Returns the edge already created for `net`.
    pub(crate) fn edge_for_net(&self, net: u64) -> Option<EdgeId> {
        self.by_net.get(&net).copied()
    }

    /// Adds `at` to one side of `edge`, unless it is already there.
    pub(crate) fn attach(
        &mut self,
        s: &mut Schematic,
        edge: EdgeId,
        at: Endpoint,
        drives: bool,
        start: usize,
        width: usize,
    ) -> Result<(), BuildError> {
        let record = s.graph.edge_mut(edge)?;
        let list = if drives {
            &mut record.sources
        } else {
            &mut record.targets
        };
        if !list.contains(&at) {
            list.push(at);
        }
        self.spans.push(BitSpan {
            port: at.port,
            edge,
            start,
            width,
            role: if drives {
                SpanRole::Source
            } else {
                SpanRole::Target
            },
        });
        Ok(())
    }

    /// Creates a constant node and its edge for the constant run starting at
    /// `start`. Returns the edge and the index just past the run.
    pub(crate) fn const_run(
        &mut self,
        s: &mut Schematic,
        parent: NodeId,
        bits: &[Bit],
        start: usize,
        depth: u32,
    ) -> Result<(EdgeId, usize), BuildError> {
        let end = bits[start..]
            .iter()
            .position(|b| !b.is_const())
            .map_or(bits.len(), |len| start + len);
        let values: Vec<Logic> = bits[start..end]
            .iter()
            .filter_map(|b| match b {
                Bit::Const(v) => Some(*v),
                Bit::Net(_) => None,
            })
            .collect();
        let label = const_node_name(&values);
        let edge = s.new_edge(&label)?;
        self.order.push(edge);
        let (node, port) = s.new_const_node(parent, &label, depth + 1)?;
        s.graph.edge_mut(edge)?.sources.push(Endpoint::new(node, port));
        trace!(edge = %edge, node = %node, label = %label, "constant driver");
        Ok((edge, end))
    }

    /// Drops edges whose endpoint lists repeat an earlier edge exactly, and
    /// returns the surviving edges in creation order with their bit spans.
    pub(crate) fn finish(self, s: &mut Schematic) -> Result<(Vec<EdgeId>, Vec<BitSpan>), BuildError> {
        let mut seen: HashMap<(Vec<Endpoint>, Vec<Endpoint>), EdgeId> = HashMap::new();
        let mut replaced: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut kept = Vec::with_capacity(self.order.len());
        for id in self.order {
            let edge = s.graph.edge(id)?;
            let key = (edge.sources.clone(), edge.targets.clone());
            match seen.get(&key) {
                Some(&first) => {
                    s.graph.remove_edge(id);
                    replaced.insert(id, first);
                }
                None => {
                    seen.insert(key, id);
                    kept.push(id);
                }
            }
        }
        let spans = self
            .spans
            .into_iter()
            .map(|span| BitSpan {
                edge: replaced.get(&span.edge).copied().unwrap_or(span.edge),
                ..span
            })
            .collect();
        Ok((kept, spans))
    }
}

/// Names the constant driver of a run of constant bits.
///
/// Bits are given least significant first. Runs of only `0`/`1` become a
/// minimal lowercase hex literal (`0x0` for all zeros); runs containing `x`
/// or `z` become a binary literal, most significant bit first.
pub fn const_node_name(bits: &[Logic]) -> String {
    let msb_first: String = bits.iter().rev().map(|b| b.to_char()).collect();
    if !bits.iter().all(|b| b.is_binary()) {
        return format!("0b{msb_first}");
    }
    let significant = msb_first.trim_start_matches('0');
    if significant.is_empty() {
        return "0x0".to_string();
    }
    let pad = (4 - significant.len() % 4) % 4;
    let padded: Vec<u8> = std::iter::repeat(b'0')
        .take(pad)
        .chain(significant.bytes())
        .collect();
    let mut hex = String::from("0x");
    for nibble in padded.chunks(4) {
        let value = nibble
            .iter()
            .fold(0u32, |acc, bit| (acc << 1) | u32::from(*bit == b'1'));
        if let Some(digit) = char::from_digit(value, 16) {
            hex.push(digit);
        }
    }
    hex
}
