//! Error and warning types for schematic construction.

use hwgraph_common::InternalError;
use hwgraph_graph::GraphError;
use hwgraph_netlist::NetlistError;
use std::fmt;

/// Errors that abort a build. No partial graph is returned.
///
/// Everything except [`BuildError::Graph`] and [`BuildError::Internal`] is a
/// problem with the netlist; those two indicate a bug in the builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The netlist document could not be read, or its top module not found.
    #[error(transparent)]
    Netlist(#[from] NetlistError),

    /// A cell connection uses a net that has no name and is not a constant.
    #[error("net {net} in module '{module}' has no declared name")]
    UndeclaredNet {
        /// Module whose connection referenced the net.
        module: String,
        /// The unnamed net id.
        net: u64,
    },

    /// A connection names a port the cell's node does not have.
    #[error("cell '{cell}' connects '{connection}' but has no such port")]
    UnmatchedConnection {
        /// Instance name of the cell.
        cell: String,
        /// The connection key.
        connection: String,
    },

    /// The direction of a connection cannot be determined.
    #[error("cell '{cell}' connection '{connection}' has no known direction")]
    UnknownDirection {
        /// Instance name of the cell.
        cell: String,
        /// The connection key.
        connection: String,
    },

    /// A blackbox cell uses a net no declared port or cell produced an edge for.
    #[error("blackbox cell '{cell}' connection '{connection}' uses net {net} which no port declares")]
    MissingEdge {
        /// Instance name of the blackbox cell.
        cell: String,
        /// The connection key.
        connection: String,
        /// The net without an edge.
        net: u64,
    },

    /// A primitive cell lacks a parameter needed to label its ports.
    #[error("cell '{cell}' is missing parameter '{name}'")]
    MissingParameter {
        /// Instance name of the cell.
        cell: String,
        /// The parameter name.
        name: String,
    },

    /// A primitive cell parameter has an unusable value.
    #[error("cell '{cell}' has invalid parameter {name}={value}")]
    InvalidParameter {
        /// Instance name of the cell.
        cell: String,
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: u64,
    },

    /// A graph invariant was broken.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The builder reached a state it should never be in.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl BuildError {
    /// Returns `true` if the error comes from the input rather than a builder bug.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, BuildError::Graph(_) | BuildError::Internal(_))
    }
}

/// Non-fatal findings collected during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// A cell type is neither a module nor a known primitive.
    UnknownPrimitive {
        /// Instance name of the cell.
        cell: String,
        /// The unrecognized cell type.
        cell_type: String,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::UnknownPrimitive { cell, cell_type } => write!(
                f,
                "cell '{cell}' has unknown type '{cell_type}'; kept as a generic block"
            ),
        }
    }
}
