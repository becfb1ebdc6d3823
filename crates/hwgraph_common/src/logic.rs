//! Four-state constant bit values as they appear in netlist bit vectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single 4-state logic value.
///
/// Netlist bit vectors use one of the tokens `"0"`, `"1"`, `"x"` or `"z"` in
/// place of a net id when a bit is tied to a constant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Parses a netlist constant token (a single-character string).
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Returns the netlist token character for this value (`0`, `1`, `x`, `z`).
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Returns `true` for the two driven values `0` and `1`.
    pub fn is_binary(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::*;
    use super::*;

    #[test]
    fn from_char_valid() {
        assert_eq!(Logic::from_char('0'), Some(Zero));
        assert_eq!(Logic::from_char('1'), Some(One));
        assert_eq!(Logic::from_char('x'), Some(X));
        assert_eq!(Logic::from_char('X'), Some(X));
        assert_eq!(Logic::from_char('z'), Some(Z));
        assert_eq!(Logic::from_char('Z'), Some(Z));
    }

    #[test]
    fn from_char_invalid() {
        assert_eq!(Logic::from_char('2'), None);
        assert_eq!(Logic::from_char(' '), None);
    }

    #[test]
    fn from_token_requires_single_char() {
        assert_eq!(Logic::from_token("x"), Some(X));
        assert_eq!(Logic::from_token("01"), None);
        assert_eq!(Logic::from_token(""), None);
    }

    #[test]
    fn token_char_is_lowercase() {
        assert_eq!(X.to_char(), 'x');
        assert_eq!(Z.to_char(), 'z');
        assert_eq!(One.to_char(), '1');
    }

    #[test]
    fn binary_values() {
        assert!(Zero.is_binary());
        assert!(One.is_binary());
        assert!(!X.is_binary());
        assert!(!Z.is_binary());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{Zero}"), "0");
        assert_eq!(format!("{X}"), "X");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Z).unwrap();
        let restored: Logic = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Z);
    }
}
