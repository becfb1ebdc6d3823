//! Pluggable comparison of port-name suffixes during edge aggregation.

use hwgraph_common::SuffixPolicy;

/// Decides whether two leaf ports line up inside their groups.
///
/// `left` and `right` are the leaf names with the owning group's name
/// stripped, e.g. `_3` for `DATA_3` under `DATA`.
pub trait SuffixComparator {
    /// Returns `true` if the two suffixes denote the same bundle member.
    fn suffixes_match(&self, left: &str, right: &str) -> bool;
}

impl SuffixComparator for SuffixPolicy {
    fn suffixes_match(&self, left: &str, right: &str) -> bool {
        self.matches(left, right)
    }
}

/// Returns the part of `name` after its group's name.
pub(crate) fn member_suffix<'a>(name: &'a str, group: &str) -> &'a str {
    name.strip_prefix(group)
        .or_else(|| name.get(group.len()..))
        .unwrap_or("")
}
