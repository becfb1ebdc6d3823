//! Error types for graph invariant checks and export.

use crate::ids::{EdgeId, NodeId, PortId};

/// Errors raised when a graph breaks one of its structural invariants.
///
/// Every variant except [`GraphError::Serialize`] indicates a bug in the
/// code that built or mutated the graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Two reachable entities carry the same id.
    #[error("duplicate id {id} in graph")]
    DuplicateId {
        /// The repeated raw id.
        id: u32,
    },

    /// A node's recorded high-water mark is below an id it contains.
    #[error("node {node} has maxId {max_id} but contains id {found}")]
    MaxIdTooSmall {
        /// The offending node.
        node: NodeId,
        /// The recorded high-water mark.
        max_id: u32,
        /// The largest id found inside the node.
        found: u32,
    },

    /// A node id is referenced but not stored.
    #[error("missing node {0}")]
    MissingNode(NodeId),

    /// A port id is referenced but not stored.
    #[error("missing port {0}")]
    MissingPort(PortId),

    /// An edge id is referenced but not stored.
    #[error("missing edge {0}")]
    MissingEdge(EdgeId),

    /// An edge endpoint names a node that is neither the edge's owner nor one of its children.
    #[error("edge {edge} in node {owner} references foreign node {node}")]
    ForeignEndpoint {
        /// The edge holding the endpoint.
        edge: EdgeId,
        /// The node whose edge list holds the edge.
        owner: NodeId,
        /// The referenced node.
        node: NodeId,
    },

    /// The id allocator was asked to move backwards.
    #[error("id allocator cannot resume at {requested}: next id is already {next}")]
    AllocatorRewind {
        /// The requested next id.
        requested: u32,
        /// The allocator's current next id.
        next: u32,
    },

    /// The id space is exhausted.
    #[error("id space exhausted")]
    IdOverflow,

    /// JSON serialization of the graph failed.
    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
}
