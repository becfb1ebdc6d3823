//! Port-name suffix matching policies.
//!
//! When a bundle of leaf ports on one node is wired leaf-for-leaf to a bundle
//! on another node, the leaf edges can only be merged into a single edge if
//! the leaf names line up. Names are compared after stripping the owning
//! group's name, e.g. `DATA_3` under `DATA` yields the suffix `_3`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How two port-name suffixes are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuffixPolicy {
    /// Suffixes must be byte-for-byte equal.
    #[default]
    Strict,
    /// A trailing `_i` on one side matches a trailing `_o` on the other.
    ///
    /// This lets a producer's `..._o` bundle connect to a consumer's
    /// identically shaped `..._i` bundle.
    IoInsensitive,
}

impl SuffixPolicy {
    /// Returns `true` if `left` and `right` are considered the same suffix.
    pub fn matches(self, left: &str, right: &str) -> bool {
        match self {
            SuffixPolicy::Strict => left == right,
            SuffixPolicy::IoInsensitive => {
                let swapped = (left.ends_with("_i") && right.ends_with("_o"))
                    || (left.ends_with("_o") && right.ends_with("_i"));
                if swapped {
                    left[..left.len() - 2] == right[..right.len() - 2]
                } else {
                    left == right
                }
            }
        }
    }

    /// Returns the configuration name of this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            SuffixPolicy::Strict => "strict",
            SuffixPolicy::IoInsensitive => "io-insensitive",
        }
    }
}

impl fmt::Display for SuffixPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown suffix policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown suffix policy '{0}' (expected 'strict' or 'io-insensitive')")]
pub struct ParseSuffixPolicyError(pub String);

impl FromStr for SuffixPolicy {
    type Err = ParseSuffixPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(SuffixPolicy::Strict),
            "io-insensitive" | "io_insensitive" => Ok(SuffixPolicy::IoInsensitive),
            other => Err(ParseSuffixPolicyError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_requires_equality() {
        assert!(SuffixPolicy::Strict.matches("_3", "_3"));
        assert!(!SuffixPolicy::Strict.matches("_data_o", "_data_i"));
    }

    #[test]
    fn io_insensitive_pairs_i_and_o() {
        let p = SuffixPolicy::IoInsensitive;
        assert!(p.matches("_data_o", "_data_i"));
        assert!(p.matches("_data_i", "_data_o"));
        assert!(!p.matches("_data_i", "_addr_o"));
    }

    #[test]
    fn io_insensitive_does_not_pair_same_direction() {
        assert!(!SuffixPolicy::IoInsensitive.matches("_a_i", "_b_i"));
        assert!(SuffixPolicy::IoInsensitive.matches("_a_i", "_a_i"));
    }

    #[test]
    fn short_suffixes() {
        let p = SuffixPolicy::IoInsensitive;
        assert!(p.matches("_i", "_o"));
        assert!(p.matches("", ""));
        assert!(!p.matches("_i", ""));
    }

    #[test]
    fn parse_names() {
        assert_eq!("strict".parse::<SuffixPolicy>(), Ok(SuffixPolicy::Strict));
        assert_eq!(
            "io-insensitive".parse::<SuffixPolicy>(),
            Ok(SuffixPolicy::IoInsensitive)
        );
        assert!("loose".parse::<SuffixPolicy>().is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for p in [SuffixPolicy::Strict, SuffixPolicy::IoInsensitive] {
            assert_eq!(p.to_string().parse::<SuffixPolicy>(), Ok(p));
        }
    }

    #[test]
    fn default_is_strict() {
        assert_eq!(SuffixPolicy::default(), SuffixPolicy::Strict);
    }
}
