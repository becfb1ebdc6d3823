//! Shared foundational types used across the hwgraph schematic compiler.
//!
//! This crate provides the 4-state constant bit value found in netlist bit
//! vectors, the port-name suffix matching policies used when aggregating
//! hierarchical edges, and the common internal-error result type.

#![warn(missing_docs)]

pub mod logic;
pub mod result;
pub mod suffix;

pub use logic::Logic;
pub use result::{HwResult, InternalError};
pub use suffix::SuffixPolicy;
