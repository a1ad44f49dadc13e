use tracing::{debug, info};

use super::{
    find_snapshots, PendingOperation, SnapshotParams, VirtualMachine, VirtualizationClient,
};
use crate::errors::TargetError;

/// What a reconciliation step did for one target
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Tasks were accepted and must be waited on, in this order
    Submitted(Vec<PendingOperation>),
    /// Desired state already holds
    Unchanged,
}

/// Per-VM snapshot decisions against an inventory fetched once per batch
pub struct SnapshotReconciler<'a, C> {
    client: &'a C,
    inventory: &'a [VirtualMachine],
}

impl<'a, C: VirtualizationClient> SnapshotReconciler<'a, C> {
    pub fn new(client: &'a C, inventory: &'a [VirtualMachine]) -> Self {
        Self { client, inventory }
    }

    fn find_vm(&self, target: &str) -> Result<&'a VirtualMachine, TargetError> {
        self.inventory
            .iter()
            .find(|vm| vm.name == target)
            .ok_or(TargetError::NotFound)
    }

    /// Create `params.name` on `target`, replacing a single same-named
    /// snapshot. Several same-named snapshots are refused.
    pub async fn create(
        &self,
        target: &str,
        params: &SnapshotParams,
    ) -> Result<Reconciliation, TargetError> {
        let vm = self.find_vm(target)?;
        let mut submitted = Vec::new();

        if let Some(tree) = &vm.snapshot_tree {
            let matches = find_snapshots(tree, &params.name);
            match matches.len() {
                0 => {}
                1 => {
                    info!(
                        "Replacing existing snapshot '{}' on {}",
                        params.name, target
                    );
                    if let Reconciliation::Submitted(ops) = self.delete(target, &params.name).await? {
                        submitted.extend(ops);
                    }
                }
                count => {
                    return Err(TargetError::AmbiguousSnapshot {
                        snapshot_name: params.name.clone(),
                        count,
                    });
                }
            }
        }

        let operation = self
            .client
            .submit_create_snapshot(vm, params)
            .await
            .map_err(|e| TargetError::SubmissionFailed {
                operation: "Creating",
                reason: e.detail(),
            })?;

        debug!("Create snapshot task {} accepted for {}", operation.task_id, target);
        submitted.push(operation);
        Ok(Reconciliation::Submitted(submitted))
    }

    /// Delete the last snapshot named `name` on `target`. Absence of a tree
    /// or of a match is success.
    pub async fn delete(&self, target: &str, name: &str) -> Result<Reconciliation, TargetError> {
        let vm = self.find_vm(target)?;

        let Some(tree) = &vm.snapshot_tree else {
            debug!("{} has no snapshots, nothing to delete", target);
            return Ok(Reconciliation::Unchanged);
        };

        let matches = find_snapshots(tree, name);
        let Some(snapshot) = matches.last() else {
            debug!("{} has no snapshot named '{}', nothing to delete", target, name);
            return Ok(Reconciliation::Unchanged);
        };

        let operation = self
            .client
            .submit_delete_snapshot(vm, snapshot, false)
            .await
            .map_err(|e| TargetError::SubmissionFailed {
                operation: "Deleting",
                reason: e.detail(),
            })?;

        debug!(
            "Delete snapshot task {} accepted for {} ({})",
            operation.task_id, target, snapshot
        );
        Ok(Reconciliation::Submitted(vec![operation]))
    }
}
