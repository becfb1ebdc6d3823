//! Single entries of a netlist bit vector.

use hwgraph_common::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit of a connection: either a net id or a constant value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBit", into = "RawBit")]
pub enum Bit {
    /// A numbered net. All endpoints sharing the id are electrically identical.
    Net(u64),
    /// A literal constant in place of a net.
    Const(Logic),
}

impl Bit {
    /// Returns `true` if this bit is a constant token.
    pub fn is_const(self) -> bool {
        matches!(self, Bit::Const(_))
    }

    /// Returns the net id, or `None` for a constant.
    pub fn net(self) -> Option<u64> {
        match self {
            Bit::Net(id) => Some(id),
            Bit::Const(_) => None,
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bit::Net(id) => write!(f, "{id}"),
            Bit::Const(value) => write!(f, "\"{}\"", value.to_char()),
        }
    }
}

/// The on-disk form of a bit: a JSON integer or a one-character string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawBit {
    Net(u64),
    Token(String),
}

impl TryFrom<RawBit> for Bit {
    type Error = String;

    fn try_from(raw: RawBit) -> Result<Self, Self::Error> {
        match raw {
            RawBit::Net(id) => Ok(Bit::Net(id)),
            RawBit::Token(token) => Logic::from_token(&token)
                .map(Bit::Const)
                .ok_or_else(|| format!("invalid constant bit token \"{token}\"")),
        }
    }
}

impl From<Bit> for RawBit {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Net(id) => RawBit::Net(id),
            Bit::Const(value) => RawBit::Token(value.to_char().to_string()),
        }
    }
}
