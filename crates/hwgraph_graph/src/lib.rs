//! Hierarchical schematic graph consumed by the layout engine.
//!
//! Nodes, ports and edges live in flat arenas keyed by typed ids. Every id
//! is drawn from one [`IdAllocator`] so that ids are unique across all three
//! kinds, and each node records the highest id reachable inside it
//! ([`Node::max_id`]). A node's children and internal edges sit behind a
//! [`NodeBody`] that is either expanded or collapsed.

#![warn(missing_docs)]

pub mod alloc;
pub mod arena;
pub mod error;
pub mod export;
pub mod graph;
pub mod ids;
pub mod model;
pub mod validate;

pub use alloc::IdAllocator;
pub use arena::{Arena, ArenaId};
pub use error::GraphError;
pub use export::{to_json_string, to_json_value};
pub use graph::{Graph, GraphStats};
pub use ids::{EdgeId, NodeId, PortId};
pub use model::{BodyState, Direction, Edge, Endpoint, Node, NodeBody, NodeClass, Port, Side};
pub use validate::{check_max_id, check_references, check_unique_ids, validate};
