//! Netlist document types deserialized from Yosys-style JSON.

use crate::bit::Bit;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A complete netlist document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// Tool banner of the program that wrote the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// All module definitions, keyed by module name.
    #[serde(default)]
    pub modules: IndexMap<String, Module>,
}

/// A module definition: its boundary ports, cell instances and named nets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    /// Module attributes; `top` marks the top-level module.
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    /// Boundary ports in declaration order.
    #[serde(default)]
    pub ports: IndexMap<String, ModulePort>,
    /// Cell instances in declaration order.
    #[serde(default)]
    pub cells: IndexMap<String, Cell>,
    /// Named nets.
    #[serde(default)]
    pub netnames: IndexMap<String, NetName>,
}

impl Module {
    /// Returns `true` if the module carries a truthy `top` attribute.
    pub fn is_top(&self) -> bool {
        self.attributes.get("top").is_some_and(value_is_truthy)
    }
}

/// Direction of a module port or cell connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Driven from outside.
    Input,
    /// Driven from inside.
    Output,
    /// Bidirectional.
    Inout,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
            PortDirection::Inout => write!(f, "inout"),
        }
    }
}

/// A boundary port of a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulePort {
    /// Port direction.
    pub direction: PortDirection,
    /// Bits of the port, least significant first.
    #[serde(default)]
    pub bits: Vec<Bit>,
}

/// One cell instance inside a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The cell type: a module name or a `$`-prefixed primitive.
    #[serde(rename = "type")]
    pub cell_type: String,
    /// Cell parameters. Values are integers or binary digit strings.
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
    /// Per-connection directions. Absent for opaque blackbox cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_directions: Option<IndexMap<String, PortDirection>>,
    /// Connection bit vectors keyed by port name.
    #[serde(default)]
    pub connections: IndexMap<String, Vec<Bit>>,
}

impl Cell {
    /// Returns a parameter interpreted as an unsigned integer.
    ///
    /// Accepts JSON integers, binary digit strings (as written for sized
    /// parameters) and decimal strings.
    pub fn param_u64(&self, name: &str) -> Option<u64> {
        self.parameters.get(name).and_then(value_as_u64)
    }

    /// Returns `true` if the parameter is present and nonzero.
    pub fn param_is_set(&self, name: &str) -> bool {
        self.param_u64(name).is_some_and(|v| v != 0)
    }
}

/// A named net: the bits that carry a given signal name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetName {
    /// Bits of the net.
    #[serde(default)]
    pub bits: Vec<Bit>,
    /// Set by the writer for compiler-generated names.
    #[serde(default)]
    pub hide_name: u8,
}

/// Interprets a parameter or attribute value as an unsigned integer.
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::Bool(b) => Some(u64::from(*b)),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c == '0' || c == '1') => {
            // Sized parameters are written as 32+ digit strings; keep the low 64 bits.
            let low = &s[s.len().saturating_sub(64)..];
            u64::from_str_radix(low, 2).ok()
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('1'),
        other => value_as_u64(other).is_some_and(|v| v != 0),
    }
}
