//! Monotonic id allocation shared by one build session.

use crate::error::GraphError;
use crate::ids::{EdgeId, NodeId, PortId};

/// Hands out node, port and edge ids from a single increasing counter.
///
/// One allocator serves a whole build, including later on-demand expansions,
/// which resume after the root's recorded high-water mark.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id the next allocation will produce.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Returns the most recently allocated id, or `None` before the first allocation.
    pub fn last(&self) -> Option<u32> {
        self.next.checked_sub(1)
    }

    fn bump(&mut self) -> Result<u32, GraphError> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or(GraphError::IdOverflow)?;
        Ok(id)
    }

    /// Allocates a node id.
    pub fn node(&mut self) -> Result<NodeId, GraphError> {
        self.bump().map(NodeId::from_raw)
    }

    /// Allocates a port id.
    pub fn port(&mut self) -> Result<PortId, GraphError> {
        self.bump().map(PortId::from_raw)
    }

    /// Allocates an edge id.
    pub fn edge(&mut self) -> Result<EdgeId, GraphError> {
        self.bump().map(EdgeId::from_raw)
    }

    /// Continues allocation after `max_id`.
    ///
    /// Fails if ids above `max_id` have already been handed out, since
    /// resuming there would produce duplicates.
    pub fn resume_after(&mut self, max_id: u32) -> Result<(), GraphError> {
        let requested = max_id.checked_add(1).ok_or(GraphError::IdOverflow)?;
        if requested < self.next {
            return Err(GraphError::AllocatorRewind {
                requested,
                next: self.next,
            });
        }
        self.next = requested;
        Ok(())
    }
}
