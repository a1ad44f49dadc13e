use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::errors::{CoordinatorError, PreconditionError, RemoteError, TargetError};
use crate::report::{merge_outcomes, BatchReport, TargetOutcome};
use crate::snapshot::{
    PendingOperation, Reconciliation, SnapshotAction, SnapshotParams, SnapshotReconciler,
    VirtualMachine, VirtualizationClient,
};

/// Runs one snapshot batch: a single inventory fetch, per-target
/// submission, then an ordered wait over every accepted task.
pub struct SnapshotService<C> {
    client: C,
    datacenter: String,
    wait_timeout: Duration,
}

impl<C: VirtualizationClient> SnapshotService<C> {
    pub fn new(client: C, datacenter: impl Into<String>, wait_timeout: Duration) -> Self {
        Self {
            client,
            datacenter: datacenter.into(),
            wait_timeout,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Validate `action` and run the batch.
    ///
    /// Errors only when nothing could be attempted (bad action, login or
    /// inventory failure). Every per-target failure lands in the report.
    pub async fn run(
        &self,
        targets: &[String],
        action: &str,
        params: &SnapshotParams,
    ) -> Result<BatchReport, CoordinatorError> {
        let action: SnapshotAction = action.parse()?;
        self.execute(targets, action, params).await
    }

    #[instrument(
        skip(self, targets, params),
        fields(batch_id = %uuid::Uuid::new_v4(), snapshot = %params.name, targets = targets.len())
    )]
    pub async fn execute(
        &self,
        targets: &[String],
        action: SnapshotAction,
        params: &SnapshotParams,
    ) -> Result<BatchReport, CoordinatorError> {
        let inventory = self.fetch_inventory().await?;
        info!(
            "Fetched {} VMs from datacenter {} for snapshot {}",
            inventory.len(),
            self.datacenter,
            action
        );

        let reconciler = SnapshotReconciler::new(&self.client, &inventory);
        let mut submission_failures = Vec::new();
        let mut pending: Vec<PendingOperation> = Vec::new();

        for target in targets {
            let step = match action {
                SnapshotAction::Create => reconciler.create(target, params).await,
                SnapshotAction::Delete => reconciler.delete(target, &params.name).await,
            };

            match step {
                Ok(Reconciliation::Submitted(ops)) => pending.extend(ops),
                Ok(Reconciliation::Unchanged) => {
                    debug!("No snapshot change needed for {}", target);
                }
                Err(e) => {
                    warn!("Snapshot {} failed on {}: {}", action, target, e);
                    submission_failures.push(TargetOutcome::failure(target.as_str(), e));
                }
            }
        }

        let completion_failures = self.wait_for_completion(&pending).await;

        let report = merge_outcomes(submission_failures.into_iter().chain(completion_failures));
        if report.is_empty() {
            info!("Snapshot {} completed on all {} targets", action, targets.len());
        } else {
            warn!(
                "Snapshot {} finished with {} failed targets out of {}",
                action,
                report.len(),
                targets.len()
            );
        }

        Ok(report)
    }

    async fn fetch_inventory(&self) -> Result<Vec<VirtualMachine>, PreconditionError> {
        self.client
            .list_all_vms(&self.datacenter)
            .await
            .map_err(|e| match e {
                RemoteError::AuthenticationFailed { endpoint } => {
                    PreconditionError::AuthenticationFailed { endpoint }
                }
                RemoteError::ScopeNotFound { scope } => {
                    PreconditionError::DatacenterNotFound { datacenter: scope }
                }
                other => PreconditionError::InventoryUnavailable {
                    datacenter: self.datacenter.clone(),
                    reason: other.to_string(),
                },
            })
    }

    /// Await every task in submission order, each bounded by the wait timeout.
    async fn wait_for_completion(&self, pending: &[PendingOperation]) -> Vec<TargetOutcome> {
        let mut failures = Vec::new();

        for operation in pending {
            let error = match timeout(self.wait_timeout, self.client.await_completion(operation)).await {
                Ok(Ok(())) => {
                    debug!(
                        "Task {} ({:?}) completed for {}",
                        operation.task_id, operation.kind, operation.entity_name
                    );
                    continue;
                }
                Ok(Err(e)) => TargetError::CompletionFailed {
                    task_id: operation.task_id.clone(),
                    reason: e.detail(),
                },
                Err(_) => TargetError::CompletionTimeout {
                    task_id: operation.task_id.clone(),
                    timeout: self.wait_timeout,
                },
            };

            warn!("Task {} failed for {}: {}", operation.task_id, operation.entity_name, error);
            failures.push(TargetOutcome::failure(operation.entity_name.as_str(), error));
        }

        failures
    }
}
