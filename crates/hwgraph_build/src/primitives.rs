//! Classification of netlist cells and labelling of primitive operators.

use crate::error::BuildError;
use hwgraph_graph::{Direction, Side};
use hwgraph_netlist::{Cell, Netlist, PortDirection};
use indexmap::IndexMap;

/// Label of the bit-concatenation operator.
pub const CONCAT: &str = "CONCAT";
/// Label of the bit-slice operator.
pub const SLICE: &str = "SLICE";
/// Label of the multiplexer operator.
pub const MUX: &str = "MUX";

/// Primitive cell types drawn as operator icons, with their labels.
///
/// Flip-flops with asynchronous reset and latches carry polarity in the label
/// and are handled by [`operator_label`] directly.
pub const OPERATOR_LABELS: &[(&str, &str)] = &[
    ("$mux", MUX),
    ("$pmux", MUX),
    ("$gt", "GT"),
    ("$lt", "LT"),
    ("$ge", "GE"),
    ("$le", "LE"),
    ("$not", "NOT"),
    ("$logic_not", "NOT"),
    ("$and", "AND"),
    ("$logic_and", "AND"),
    ("$or", "OR"),
    ("$logic_or", "OR"),
    ("$xor", "XOR"),
    ("$eq", "EQ"),
    ("$ne", "NE"),
    ("$add", "ADD"),
    ("$sub", "SUB"),
    ("$mul", "MUL"),
    ("$div", "DIV"),
    ("$slice", SLICE),
    ("$concat", CONCAT),
    ("$dff", "FF"),
    ("$shift", "SHIFT"),
    ("$shiftx", "SHIFT"),
];

/// What a cell becomes in the schematic.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind<'n> {
    /// The cell instantiates a module defined in the netlist.
    ModuleInstance {
        /// Name of the instantiated module.
        module: &'n str,
    },
    /// A recognized primitive with declared port directions.
    KnownPrimitive {
        /// Operator label, used as the node name.
        label: String,
        /// Declared port directions in netlist order.
        ports: &'n IndexMap<String, PortDirection>,
    },
    /// Anything else. Ports come from `port_directions` if present, otherwise
    /// they are created on demand from the connections.
    UnknownBlackbox {
        /// Declared port directions, if any.
        ports: Option<&'n IndexMap<String, PortDirection>>,
    },
}

impl<'n> CellKind<'n> {
    /// Classifies a cell of `netlist`.
    pub fn classify(netlist: &'n Netlist, cell: &'n Cell) -> Self {
        if let Some((name, _)) = netlist.modules.get_key_value(&cell.cell_type) {
            return CellKind::ModuleInstance {
                module: name.as_str(),
            };
        }
        match (operator_label(cell), cell.port_directions.as_ref()) {
            (Some(label), Some(ports)) => CellKind::KnownPrimitive { label, ports },
            (_, ports) => CellKind::UnknownBlackbox { ports },
        }
    }
}

/// Returns the operator label for a primitive cell, or `None` if the type is
/// not drawn as an operator.
pub fn operator_label(cell: &Cell) -> Option<String> {
    match cell.cell_type.as_str() {
        "$adff" => Some(format!(
            "FF_ARST_clk{}_rst{}",
            u8::from(cell.param_is_set("CLK_POLARITY")),
            u8::from(cell.param_is_set("ARST_POLARITY"))
        )),
        "$dlatch" => Some(format!(
            "DLATCH_en{}",
            u8::from(cell.param_is_set("EN_POLARITY"))
        )),
        other => OPERATOR_LABELS
            .iter()
            .find(|(cell_type, _)| *cell_type == other)
            .map(|(_, label)| label.to_string()),
    }
}

/// Returns `true` for operator labels whose ports get flip-flop ordering.
pub fn is_flip_flop(label: &str) -> bool {
    label.starts_with("FF")
}

/// Chooses the side of a freshly created port.
pub fn port_side(node_name: &str, port_label: &str, direction: Direction) -> Side {
    match direction {
        Direction::Input if node_name == MUX && port_label == "S" => Side::South,
        Direction::Input => Side::West,
        Direction::Output => Side::East,
    }
}

/// Maps a netlist direction onto a graph direction.
///
/// Bidirectional ports are drawn as inputs.
pub fn graph_direction(direction: PortDirection) -> Direction {
    match direction {
        PortDirection::Input | PortDirection::Inout => Direction::Input,
        PortDirection::Output => Direction::Output,
    }
}

/// Returns the display label of a primitive port.
///
/// Slice outputs and concat inputs show the bit range they carry; the
/// single wide port of either operator is left unlabelled.
pub fn port_label(cell_name: &str, cell: &Cell, port: &str) -> Result<String, BuildError> {
    match (cell.cell_type.as_str(), port) {
        ("$slice", "A") | ("$concat", "Y") => Ok(String::new()),
        ("$slice", "Y") => {
            let offset = required_param(cell_name, cell, "OFFSET")?;
            let width = required_param(cell_name, cell, "Y_WIDTH")?;
            bit_range(cell_name, "Y_WIDTH", offset, width)
        }
        ("$concat", "A") => {
            let width = required_param(cell_name, cell, "A_WIDTH")?;
            bit_range(cell_name, "A_WIDTH", 0, width)
        }
        ("$concat", "B") => {
            let start = required_param(cell_name, cell, "A_WIDTH")?;
            let width = required_param(cell_name, cell, "B_WIDTH")?;
            bit_range(cell_name, "B_WIDTH", start, width)
        }
        _ => Ok(port.to_string()),
    }
}

fn required_param(cell_name: &str, cell: &Cell, name: &str) -> Result<u64, BuildError> {
    cell.param_u64(name).ok_or_else(|| BuildError::MissingParameter {
        cell: cell_name.to_string(),
        name: name.to_string(),
    })
}

fn bit_range(cell_name: &str, width_param: &str, start: u64, width: u64) -> Result<String, BuildError> {
    match width {
        0 => Err(BuildError::InvalidParameter {
            cell: cell_name.to_string(),
            name: width_param.to_string(),
            value: width,
        }),
        1 => Ok(format!("[{start}]")),
        _ => Ok(format!("[{}:{start}]", start + width)),
    }
}
