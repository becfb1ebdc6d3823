//! Configuration types deserialized from `hwgraph.toml`.

use hwgraph_common::SuffixPolicy;
use serde::Deserialize;

/// The complete configuration parsed from `hwgraph.toml`.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HwgraphConfig {
    /// Graph construction settings.
    #[serde(default)]
    pub build: BuildSection,
    /// JSON output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// The `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Deepest hierarchy level to build; absent builds everything.
    #[serde(default)]
    pub depth_limit: Option<u32>,
    /// How port-name suffixes are compared when merging bundled edges.
    #[serde(default)]
    pub suffix_policy: SuffixPolicy,
    /// Top module name, overriding the module marked `top` in the netlist.
    #[serde(default)]
    pub top: Option<String>,
}

/// The `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Indent the emitted JSON.
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Check graph invariants before writing output.
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty: true,
            validate: true,
        }
    }
}

fn default_true() -> bool {
    true
}
