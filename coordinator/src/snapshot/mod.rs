//! VM snapshot handling for patch windows
//!
//! ```text
//! inventory (once) ─→ reconciler (per target) ─→ pending tasks ─→ wait ─→ report
//!                          │
//!                       resolver (name lookup in the snapshot tree)
//! ```
//!
//! The control plane is reached through [`VirtualizationClient`], so the
//! batch logic runs unchanged against the REST client or a test double.

pub mod reconciler;
pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PreconditionError, RemoteError};

pub use reconciler::{Reconciliation, SnapshotReconciler};
pub use resolver::find_snapshots;

/// Opaque control-plane handle of one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotRef(pub String);

impl fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub name: String,
    #[serde(rename = "snapshot")]
    pub snapshot_ref: SnapshotRef,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(rename = "vm")]
    pub id: String,
    pub name: String,
    /// `None` when the VM has never had a snapshot
    #[serde(default)]
    pub snapshot_tree: Option<Vec<SnapshotNode>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    CreateSnapshot,
    DeleteSnapshot,
}

/// Handle to an accepted, not yet finished, remote task
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub task_id: String,
    /// Name of the VM the task acts on; failures are reported under it
    pub entity_name: String,
    pub kind: OperationKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotParams {
    pub name: String,
    pub description: Option<String>,
    pub memory: bool,
    pub quiesce: bool,
}

impl SnapshotParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotAction {
    Create,
    Delete,
}

impl FromStr for SnapshotAction {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(SnapshotAction::Create),
            "delete" => Ok(SnapshotAction::Delete),
            other => Err(PreconditionError::InvalidAction {
                action: other.to_string(),
                expected: "create or delete",
            }),
        }
    }
}

impl fmt::Display for SnapshotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotAction::Create => f.write_str("create"),
            SnapshotAction::Delete => f.write_str("delete"),
        }
    }
}

/// Virtualization control plane operations used by snapshot batches
#[allow(async_fn_in_trait)]
pub trait VirtualizationClient {
    /// All VMs in `datacenter`, with their snapshot trees.
    async fn list_all_vms(&self, datacenter: &str) -> Result<Vec<VirtualMachine>, RemoteError>;

    async fn submit_create_snapshot(
        &self,
        vm: &VirtualMachine,
        params: &SnapshotParams,
    ) -> Result<PendingOperation, RemoteError>;

    async fn submit_delete_snapshot(
        &self,
        vm: &VirtualMachine,
        snapshot: &SnapshotRef,
        remove_children: bool,
    ) -> Result<PendingOperation, RemoteError>;

    /// Block until the task reaches a terminal state; `Err` when it failed.
    async fn await_completion(&self, operation: &PendingOperation) -> Result<(), RemoteError>;
}
