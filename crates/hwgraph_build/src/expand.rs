//! Building subtrees that were left out by the depth limit.

use crate::builder::Builder;
use crate::error::BuildError;
use crate::schematic::Schematic;
use hwgraph_common::InternalError;
use hwgraph_graph::NodeId;
use hwgraph_netlist::{Netlist, NetlistError};
use tracing::{debug, info};

impl Schematic {
    /// Materializes the internals of the node at `path`.
    ///
    /// `path` lists instance names starting with the top module. The walk
    /// follows the built graph as far as it goes and builds one more level
    /// below the deepest node reached. Returns that node, the same node
    /// unchanged if it was already built, or `None` if the path does not
    /// name a module instance in `netlist`.
    ///
    /// `netlist` must be the document the schematic was built from.
    pub fn load_subtree_by_path<S: AsRef<str>>(
        &mut self,
        netlist: &Netlist,
        path: &[S],
    ) -> Result<Option<NodeId>, BuildError> {
        if netlist.module_by_path(self.top.as_deref(), path)?.is_none() {
            debug!(path = %join(path), "path names no module instance");
            return Ok(None);
        }
        let trail = self.find_path(path)?;
        let target = trail.last().copied().unwrap_or(self.root);
        if target == self.root {
            return Ok(None);
        }
        let record = self
            .registry
            .get(&target)
            .cloned()
            .ok_or_else(|| InternalError::new(format!("node {target} has no build record")))?;
        let Some(module_name) = record.module else {
            return Ok(None);
        };
        if record.materialized {
            return Ok(Some(target));
        }

        let module = netlist
            .module(&module_name)
            .ok_or_else(|| NetlistError::UnknownModule(module_name.clone()))?;
        let root_max = self.graph.node(self.root)?.max_id;
        self.alloc.resume_after(root_max)?;
        Builder::new(netlist, self, Some(record.depth + 1)).load_internals(
            target,
            &module_name,
            module,
            record.depth,
        )?;
        self.aggregate_in(target)?;
        for node in trail {
            self.touch(node)?;
        }
        info!(
            node = %target,
            instance = %record.instance,
            module = %module_name,
            depth = record.depth,
            "expanded subtree"
        );
        Ok(Some(target))
    }
}

fn join<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|p| p.as_ref()).collect::<Vec<&str>>().join(".")
}
