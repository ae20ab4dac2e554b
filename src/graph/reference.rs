//! Qualification of variable references.
//!
//! CF-Convention reference attributes name other variables relative to the
//! group of the referring variable. These helpers turn every reference into
//! an absolute path.
//!
//! See the CF Conventions for the attributes themselves:
//!
//! - Section 3.4: `ancillary_variables`
//! - Sections 4 and 5: `coordinates`
//! - Section 5.6: `grid_mapping`
//! - Section 7.1: `bounds`
//! - Section 7.2: `cell_measures`
//! - Section 7.5: `geometry`, `interior_ring`, `node_coordinates`,
//!   `node_count`, `nodes`, `part_node_count`
//!
//! `subset_control_variables` is not part of the Conventions; it links
//! segmented data to the variables that index it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Metadata attributes whose values name other variables.
pub const CF_REFERENCE_ATTRIBUTES: [&str; 12] = [
    "ancillary_variables",
    "bounds",
    "cell_measures",
    "coordinates",
    "geometry",
    "grid_mapping",
    "interior_ring",
    "node_coordinates",
    "node_count",
    "nodes",
    "part_node_count",
    "subset_control_variables",
];

static MULTIVALUE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+|,\s*").unwrap());

/// Split an attribute value listing several references, separated by
/// whitespace and/or commas.
pub fn split_multivalue(raw_value: &str) -> Vec<String> {
    MULTIVALUE_SEPARATOR
        .split(raw_value)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a reference into an absolute path.
///
/// `group_path` is the group of the referring variable, `None` at the root.
/// A single trailing colon is dropped first: some `grid_mapping` values take
/// the form `"crs: grid_y crs: grid_x"`.
pub fn qualify(group_path: Option<&str>, raw_reference: &str) -> String {
    let reference = raw_reference.strip_suffix(':').unwrap_or(raw_reference);

    let Some(group_path) = group_path else {
        return if reference.starts_with('/') {
            reference.to_string()
        } else {
            format!("/{}", reference)
        };
    };

    if reference.starts_with("../") {
        parent_relative(group_path, reference)
    } else if reference.starts_with('/') {
        reference.to_string()
    } else if let Some(local) = reference.strip_prefix("./") {
        format!("{}/{}", group_path, local)
    } else {
        format!("{}/{}", group_path, reference)
    }
}

/// Qualify every reference in a list, preserving order.
pub fn qualify_all<S: AsRef<str>>(group_path: Option<&str>, raw_references: &[S]) -> Vec<String> {
    raw_references
        .iter()
        .map(|reference| qualify(group_path, reference.as_ref()))
        .collect()
}

/// Resolve a `../` reference by dropping one group from `group_path` for
/// each leading `../`.
fn parent_relative(group_path: &str, reference: &str) -> String {
    let mut pieces: Vec<&str> = group_path.split('/').collect();
    let mut remainder = reference;

    while let Some(rest) = remainder.strip_prefix("../") {
        remainder = rest;
        pieces.pop();
    }

    pieces.push(remainder);
    let absolute_path = pieces.join("/");

    if absolute_path.starts_with('/') {
        absolute_path
    } else {
        // More `../` than groups: fall back to the root.
        tracing::warn!(
            "Reference {} climbs above the root from {}; treating it as root-relative",
            reference,
            group_path
        );
        format!("/{}", absolute_path)
    }
}

/// Split a full path into its group path and base name. Variables at the
/// root have no group path: `/lat` gives `(None, "lat")`.
pub fn split_group_and_name(full_path: &str) -> (Option<String>, String) {
    match full_path.rsplit_once('/') {
        Some((group, name)) if !group.is_empty() => (Some(group.to_string()), name.to_string()),
        Some((_, name)) => (None, name.to_string()),
        None => (None, full_path.to_string()),
    }
}

/// Join a group path and a child name.
pub fn join_path(group_path: &str, name: &str) -> String {
    format!("{}/{}", group_path.trim_end_matches('/'), name)
}
