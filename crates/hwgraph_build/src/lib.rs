//! Compiles a gate-level netlist into a hierarchical schematic graph.
//!
//! [`Schematic::build`] walks the netlist from its top module, creating one
//! node per module instance and primitive cell and one edge per net. Along
//! the way it folds chains of concat/slice operators, groups ports into
//! bundles by name and merges bundles of parallel edges. Nodes beyond the
//! depth limit are left as stubs and can be built later with
//! [`Schematic::load_subtree_by_path`].

#![warn(missing_docs)]

mod aggregate;
mod builder;
pub mod error;
mod expand;
mod fold;
mod hierarchy;
pub mod primitives;
pub mod resolve;
pub mod schematic;
pub mod suffix;

pub use error::{BuildError, BuildWarning};
pub use primitives::CellKind;
pub use resolve::const_node_name;
pub use schematic::{BitSpan, BuildOptions, NodeBuilder, PortOwner, Schematic, SpanRole};
pub use suffix::SuffixComparator;
