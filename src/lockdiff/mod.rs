//! Dependency-lock diffing
//!
//! Flattens the nested dependency tree captured in a lockfile snapshot into
//! qualified-path → version maps and computes an additions/removals/changes
//! report rendered as a Markdown table for PR descriptions.
//!
//! Everything here is pure; snapshot loading degrades to an empty tree so a
//! missing or malformed snapshot simply reports everything in the other
//! snapshot as new/removed.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Separator between ancestor package names in a qualified path
pub const PATH_SEPARATOR: &str = " > ";

/// Placeholder version for a package absent from one of the snapshots
pub const ABSENT_VERSION: &str = "N/A";

/// Traversal depth guard; lockfile nesting never comes close in practice
const MAX_DEPTH: usize = 64;

/// One node of the nested dependency tree
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyNode {
    /// Resolved version; nodes without one are traversed but not reported
    pub version: Option<String>,
    /// Nested dependencies, keyed by package name in snapshot order
    #[serde(default)]
    pub dependencies: DependencyTree,
}

/// A nested dependency tree, keyed by package name.
///
/// Insertion order is the snapshot's order and governs diff output order,
/// so the map type must preserve it.
pub type DependencyTree = IndexMap<String, DependencyNode>;

/// A flattened qualified-path → version map
pub type PathMap = IndexMap<String, String>;

/// Status of one dependency path across the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    /// Present only in the after-snapshot
    Added,
    /// Present only in the before-snapshot
    Removed,
    /// Present in both with different versions
    Changed,
}

/// One row of the dependency diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    /// Qualified path ("a > b > c")
    pub path: String,
    /// Version in the before-snapshot, or "N/A"
    pub old_version: String,
    /// Version in the after-snapshot, or "N/A"
    pub new_version: String,
    /// What happened to this path
    pub status: DiffStatus,
}

/// Load a dependency snapshot from disk.
///
/// A missing or unparsable file is an empty tree, not an error: the diff
/// then degrades to reporting everything in the other snapshot.
pub fn load_snapshot(path: &Path) -> DependencyTree {
    let Ok(contents) = std::fs::read_to_string(path) else {
        warn!(path = %path.display(), "dependency snapshot missing, treating as empty");
        return DependencyTree::new();
    };

    #[derive(Deserialize)]
    struct Snapshot {
        #[serde(default)]
        dependencies: DependencyTree,
    }

    match serde_json::from_str::<Snapshot>(&contents) {
        Ok(snapshot) => snapshot.dependencies,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dependency snapshot unparsable, treating as empty");
            DependencyTree::new()
        }
    }
}

/// Flatten a dependency tree into a qualified-path → version map.
///
/// Depth-first, visiting entries in snapshot order so the resulting map's
/// insertion order is deterministic. Nodes without a version are skipped
/// for emission but still traversed for children.
pub fn flatten(tree: &DependencyTree) -> PathMap {
    let mut map = PathMap::new();
    flatten_into(tree, None, 0, &mut map);
    map
}

fn flatten_into(tree: &DependencyTree, parent: Option<&str>, depth: usize, map: &mut PathMap) {
    if depth >= MAX_DEPTH {
        warn!(depth, "dependency tree exceeds depth limit, skipping deeper entries");
        return;
    }

    for (name, node) in tree {
        let path = parent.map_or_else(
            || name.clone(),
            |prefix| format!("{prefix}{PATH_SEPARATOR}{name}"),
        );

        if let Some(version) = &node.version {
            map.insert(path.clone(), version.clone());
        }

        if !node.dependencies.is_empty() {
            flatten_into(&node.dependencies, Some(&path), depth + 1, map);
        }
    }
}

/// Compute the diff between two flattened snapshots.
///
/// Added and changed paths come first, in the after-map's insertion order;
/// removed paths follow, in the before-map's insertion order. Unchanged
/// paths are never emitted. The ordering is deterministic so rendered PR
/// descriptions are reproducible.
pub fn diff(before: &PathMap, after: &PathMap) -> Vec<DiffRecord> {
    let mut records = Vec::new();

    for (path, new_version) in after {
        match before.get(path) {
            None => records.push(DiffRecord {
                path: path.clone(),
                old_version: ABSENT_VERSION.to_string(),
                new_version: new_version.clone(),
                status: DiffStatus::Added,
            }),
            Some(old_version) if old_version != new_version => records.push(DiffRecord {
                path: path.clone(),
                old_version: old_version.clone(),
                new_version: new_version.clone(),
                status: DiffStatus::Changed,
            }),
            Some(_) => {}
        }
    }

    for (path, old_version) in before {
        if !after.contains_key(path) {
            records.push(DiffRecord {
                path: path.clone(),
                old_version: old_version.clone(),
                new_version: ABSENT_VERSION.to_string(),
                status: DiffStatus::Removed,
            });
        }
    }

    records
}

/// Render diff records as a Markdown table.
///
/// An empty diff renders as an empty string. No size limit is applied
/// here; truncation policy belongs to the PR-body composer.
pub fn render_table(records: &[DiffRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut table = String::from("| Package | Old Version | New Version |\n| --- | --- | --- |");
    for record in records {
        let marker = match record.status {
            DiffStatus::Added => " (NEW)",
            DiffStatus::Removed => " (REMOVED)",
            DiffStatus::Changed => "",
        };
        table.push_str(&format!(
            "\n| {}{} | {} | {} |",
            record.path, marker, record.old_version, record.new_version
        ));
    }
    table
}
