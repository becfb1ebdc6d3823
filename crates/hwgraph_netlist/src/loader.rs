//! Netlist file loading.

use crate::error::NetlistError;
use crate::model::Netlist;
use std::path::Path;
use tracing::debug;

/// Loads a netlist document from a JSON file.
pub fn load_netlist(path: &Path) -> Result<Netlist, NetlistError> {
    let content = std::fs::read_to_string(path)?;
    let netlist = load_netlist_from_str(&content)?;
    debug!(
        path = %path.display(),
        modules = netlist.modules.len(),
        "loaded netlist"
    );
    Ok(netlist)
}

/// Parses a netlist document from a JSON string.
pub fn load_netlist_from_str(content: &str) -> Result<Netlist, NetlistError> {
    serde_json::from_str(content).map_err(|e| NetlistError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SMALL: &str = r#"{
        "creator": "Yosys 0.9",
        "modules": {
            "inv": {
                "attributes": { "top": 1 },
                "ports": {
                    "a": { "direction": "input", "bits": [2] },
                    "y": { "direction": "output", "bits": [3] }
                },
                "cells": {
                    "$not$1": {
                        "type": "$not",
                        "parameters": { "A_WIDTH": 1 },
                        "port_directions": { "A": "input", "Y": "output" },
                        "connections": { "A": [2], "Y": [3] }
                    }
                },
                "netnames": {
                    "a": { "bits": [2] },
                    "y": { "bits": [3] }
                }
            }
        }
    }"#;

    #[test]
    fn parse_from_str() {
        let netlist = load_netlist_from_str(SMALL).unwrap();
        assert_eq!(netlist.creator.as_deref(), Some("Yosys 0.9"));
        assert_eq!(netlist.modules["inv"].cells.len(), 1);
    }

    #[test]
    fn invalid_json_errors() {
        let err = load_netlist_from_str("{ not json").unwrap_err();
        assert!(matches!(err, NetlistError::Parse(_)));
    }

    #[test]
    fn invalid_bit_token_errors() {
        let doc = r#"{ "modules": { "m": { "ports": {
            "a": { "direction": "input", "bits": ["q"] } } } } }"#;
        let err = load_netlist_from_str(doc).unwrap_err();
        assert!(matches!(err, NetlistError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("inv.json");
        fs::write(&path, SMALL).unwrap();
        let netlist = load_netlist(&path).unwrap();
        assert!(netlist.modules.contains_key("inv"));
    }

    #[test]
    fn missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let err = load_netlist(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, NetlistError::Io(_)));
    }
}
