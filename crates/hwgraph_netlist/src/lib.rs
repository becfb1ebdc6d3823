//! Strongly typed model of the gate-level netlist documents consumed by hwgraph.
//!
//! The input is a Yosys-style JSON document: a map of modules, each holding
//! its ports, cell instances and named nets, where every connection is a
//! bit vector of net ids or constant tokens. Map order is preserved because
//! port, cell and connection order drive id allocation and port placement.

#![warn(missing_docs)]

pub mod bit;
pub mod error;
pub mod loader;
pub mod model;
pub mod query;

pub use bit::Bit;
pub use error::NetlistError;
pub use loader::{load_netlist, load_netlist_from_str};
pub use model::{Cell, Module, ModulePort, NetName, Netlist, PortDirection};
pub use query::NetNameIndex;
