//! REST client for the virtualization control plane.
//!
//! Endpoints (JSON, session-authenticated):
//!
//! ```text
//! POST   /api/session                                  basic auth -> "<token>"
//! GET    /api/vcenter/datacenter/{datacenter}/vm       -> [{vm, name, snapshot_tree?}]
//! POST   /api/vcenter/vm/{vm}/snapshots                -> {task}
//! DELETE /api/vcenter/snapshots/{snapshot}?remove_children=<bool> -> {task}
//! GET    /api/cis/tasks/{task}                         -> {status, error?}
//! ```
//!
//! The session token is obtained on the first call and reused for the rest
//! of the batch. A request rejected with 401 triggers one fresh login and a
//! single resend.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::client::{read_json, HttpHelper, HttpOptions, TlsPolicy};
use crate::config::VcenterConfig;
use crate::constants::{http, vcenter};
use crate::errors::RemoteError;
use crate::snapshot::{
    OperationKind, PendingOperation, SnapshotParams, SnapshotRef, VirtualMachine,
    VirtualizationClient,
};

#[derive(Debug, Serialize)]
struct CreateSnapshotBody<'a> {
    name: &'a str,
    description: Option<&'a str>,
    memory: bool,
    quiesce: bool,
}

#[derive(Debug, Deserialize)]
struct TaskAccepted {
    task: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TaskErrorInfo {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskInfo {
    status: TaskStatus,
    error: Option<TaskErrorInfo>,
}

pub struct VcenterClient {
    http: HttpHelper,
    base_url: Url,
    username: String,
    password: String,
    session: RwLock<Option<String>>,
    poll_interval: Duration,
}

impl VcenterClient {
    pub fn new(
        host: &str,
        username: &str,
        password: &str,
        tls: TlsPolicy,
        poll_interval: Duration,
    ) -> Result<Self, RemoteError> {
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        let base_url = Url::parse(&base).map_err(|e| RemoteError::ConnectionFailed {
            endpoint: host.to_string(),
            reason: format!("Invalid control plane URL: {}", e),
        })?;

        let http = HttpHelper::new(HttpOptions {
            tls,
            redirect_limit: http::REDIRECT_LIMIT,
            ..Default::default()
        })?;

        Ok(Self {
            http,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            session: RwLock::new(None),
            poll_interval,
        })
    }

    pub fn from_config(config: &VcenterConfig) -> Result<Self, RemoteError> {
        Self::new(
            &config.host,
            &config.username,
            config.password.as_deref().unwrap_or_default(),
            TlsPolicy::from_settings(config.insecure, config.ca_file.as_deref()),
            config.poll_interval(),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::ConnectionFailed {
                endpoint: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn session_token(&self) -> Result<String, RemoteError> {
        if let Some(token) = self.session.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut session = self.session.write().await;
        if let Some(token) = session.as_ref() {
            return Ok(token.clone());
        }

        let url = self.endpoint(&["api", "session"])?;
        info!("Logging in to {} as {}", self.base_url, self.username);

        let request = self
            .http
            .request(Method::POST, url.as_str())
            .basic_auth(&self.username, Some(&self.password));
        let token: String = read_json(self.http.send(request).await?).await?;

        *session = Some(token.clone());
        Ok(token)
    }

    async fn authorized(&self, method: Method, url: &Url) -> Result<RequestBuilder, RemoteError> {
        let token = self.session_token().await?;
        Ok(self
            .http
            .request(method, url.as_str())
            .header(vcenter::SESSION_HEADER, token))
    }

    /// Send with the session header. A 401 means the session expired
    /// mid-batch: log in again and resend once.
    async fn send_authorized<F>(&self, method: Method, url: &Url, prepare: F) -> Result<Response, RemoteError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let request = prepare(self.authorized(method.clone(), url).await?);
        match self.http.send(request).await {
            Err(RemoteError::AuthenticationFailed { .. }) => {
                warn!("Session rejected by {}, logging in again", self.base_url);
                self.session.write().await.take();
                let request = prepare(self.authorized(method, url).await?);
                self.http.send(request).await
            }
            other => other,
        }
    }

    async fn task_info(&self, task_id: &str) -> Result<TaskInfo, RemoteError> {
        let url = self.endpoint(&["api", "cis", "tasks", task_id])?;
        read_json(self.send_authorized(Method::GET, &url, |r| r).await?).await
    }
}

impl VirtualizationClient for VcenterClient {
    async fn list_all_vms(&self, datacenter: &str) -> Result<Vec<VirtualMachine>, RemoteError> {
        let url = self.endpoint(&["api", "vcenter", "datacenter", datacenter, "vm"])?;
        match self.send_authorized(Method::GET, &url, |r| r).await {
            Ok(response) => read_json(response).await,
            Err(RemoteError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(RemoteError::ScopeNotFound {
                    scope: datacenter.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_create_snapshot(
        &self,
        vm: &VirtualMachine,
        params: &SnapshotParams,
    ) -> Result<PendingOperation, RemoteError> {
        let url = self.endpoint(&["api", "vcenter", "vm", &vm.id, "snapshots"])?;
        let body = CreateSnapshotBody {
            name: &params.name,
            description: params.description.as_deref(),
            memory: params.memory,
            quiesce: params.quiesce,
        };

        let response = self
            .send_authorized(Method::POST, &url, |r| r.json(&body))
            .await?;
        let accepted: TaskAccepted = read_json(response).await?;
        info!("Snapshot '{}' requested on {} (task {})", params.name, vm.name, accepted.task);

        Ok(PendingOperation {
            task_id: accepted.task,
            entity_name: vm.name.clone(),
            kind: OperationKind::CreateSnapshot,
        })
    }

    async fn submit_delete_snapshot(
        &self,
        vm: &VirtualMachine,
        snapshot: &SnapshotRef,
        remove_children: bool,
    ) -> Result<PendingOperation, RemoteError> {
        let mut url = self.endpoint(&["api", "vcenter", "snapshots", &snapshot.0])?;
        url.query_pairs_mut()
            .append_pair("remove_children", if remove_children { "true" } else { "false" });

        let response = self.send_authorized(Method::DELETE, &url, |r| r).await?;
        let accepted: TaskAccepted = read_json(response).await?;
        info!("Snapshot {} removal requested on {} (task {})", snapshot, vm.name, accepted.task);

        Ok(PendingOperation {
            task_id: accepted.task,
            entity_name: vm.name.clone(),
            kind: OperationKind::DeleteSnapshot,
        })
    }

    async fn await_completion(&self, operation: &PendingOperation) -> Result<(), RemoteError> {
        let mut consecutive_failures = 0;

        loop {
            match self.task_info(&operation.task_id).await {
                Ok(info) => {
                    consecutive_failures = 0;
                    match info.status {
                        TaskStatus::Succeeded => {
                            debug!("Task {} succeeded", operation.task_id);
                            return Ok(());
                        }
                        TaskStatus::Failed => {
                            let message = info
                                .error
                                .and_then(|e| e.message)
                                .unwrap_or_else(|| "task failed with unknown error".to_string());
                            return Err(RemoteError::TaskFailed {
                                task_id: operation.task_id.clone(),
                                message,
                            });
                        }
                        TaskStatus::Pending | TaskStatus::Running => {}
                        TaskStatus::Unknown => {
                            warn!(
                                "Unknown status for task {}, treating as running",
                                operation.task_id
                            );
                        }
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Status check for task {} failed: {} (attempt {}/{})",
                        operation.task_id,
                        e,
                        consecutive_failures,
                        vcenter::MAX_CONSECUTIVE_POLL_FAILURES
                    );
                    if consecutive_failures >= vcenter::MAX_CONSECUTIVE_POLL_FAILURES {
                        return Err(e);
                    }
                }
            }

            sleep(self.poll_interval).await;
        }
    }
}
