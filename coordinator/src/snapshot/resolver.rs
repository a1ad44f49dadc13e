use super::{SnapshotNode, SnapshotRef};

/// Collect the handle of every snapshot named `name`.
///
/// Depth-first, pre-order: a node is recorded before its children and
/// siblings keep their input order. Callers treat the last element as the
/// most recent match. Uses an explicit stack so deep trees cannot overflow.
pub fn find_snapshots(tree: &[SnapshotNode], name: &str) -> Vec<SnapshotRef> {
    let mut matches = Vec::new();
    let mut stack: Vec<&SnapshotNode> = tree.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.name == name {
            matches.push(node.snapshot_ref.clone());
        }
        stack.extend(node.children.iter().rev());
    }

    matches
}
