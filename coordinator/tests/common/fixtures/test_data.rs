//! Common test data: VMs and snapshot trees

use coordinator::snapshot::{SnapshotNode, SnapshotRef, VirtualMachine};

pub const DATACENTER: &str = "dc-test";

/// Snapshot node without children
pub fn leaf(name: &str, handle: &str) -> SnapshotNode {
    node(name, handle, Vec::new())
}

pub fn node(name: &str, handle: &str, children: Vec<SnapshotNode>) -> SnapshotNode {
    SnapshotNode {
        name: name.to_string(),
        snapshot_ref: SnapshotRef(handle.to_string()),
        children,
    }
}

/// VM that has never had a snapshot
pub fn vm(name: &str) -> VirtualMachine {
    VirtualMachine {
        id: format!("vm-id-{}", name),
        name: name.to_string(),
        snapshot_tree: None,
    }
}

pub fn vm_with_tree(name: &str, tree: Vec<SnapshotNode>) -> VirtualMachine {
    VirtualMachine {
        snapshot_tree: Some(tree),
        ..vm(name)
    }
}

pub fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
