//! Mock virtualization REST endpoint for testing the HTTP client

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use coordinator::http::TlsPolicy;
use coordinator::VcenterClient;

pub const SESSION_TOKEN: &str = "session-token-1";
const SESSION_HEADER: &str = "vmware-api-session-id";

pub struct MockVcenterServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockVcenterServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Client pointed at this server with a short poll interval
    pub fn client(&self) -> VcenterClient {
        VcenterClient::new(
            &self.base_url,
            "administrator",
            "secret",
            TlsPolicy::Verify,
            Duration::from_millis(10),
        )
        .expect("Failed to build client")
    }

    /// Basic-auth login answers with a session token
    pub async fn mock_login_success(&self) {
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(SESSION_TOKEN)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_login_unauthorized(&self) {
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// VM listing for `datacenter`; requires the session header
    pub async fn mock_vm_list(&self, datacenter: &str, vms: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/vcenter/datacenter/{}/vm", datacenter)))
            .and(header(SESSION_HEADER, SESSION_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(vms))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_datacenter_missing(&self, datacenter: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/vcenter/datacenter/{}/vm", datacenter)))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such datacenter"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_snapshot(&self, vm_id: &str, task_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/api/vcenter/vm/{}/snapshots", vm_id)))
            .and(header(SESSION_HEADER, SESSION_TOKEN))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "task": task_id })))
            .mount(&self.server)
            .await;
    }

    /// Create that only matches when the request body equals `body`
    pub async fn mock_create_snapshot_with_body(&self, vm_id: &str, task_id: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/api/vcenter/vm/{}/snapshots", vm_id)))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "task": task_id })))
            .mount(&self.server)
            .await;
    }

    /// VM listing answers 401 once, as after a session timeout
    pub async fn mock_vm_list_session_expired_once(&self, datacenter: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/vcenter/datacenter/{}/vm", datacenter)))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Task status answers 401 once
    pub async fn mock_task_session_expired_once(&self, task_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cis/tasks/{}", task_id)))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_snapshot_rejected(&self, vm_id: &str, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/api/vcenter/vm/{}/snapshots", vm_id)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Delete that only matches when children are kept
    pub async fn mock_delete_snapshot(&self, snapshot: &str, task_id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/vcenter/snapshots/{}", snapshot)))
            .and(query_param("remove_children", "false"))
            .and(header(SESSION_HEADER, SESSION_TOKEN))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "task": task_id })))
            .mount(&self.server)
            .await;
    }

    /// Task reports `status` for the next `times` polls
    pub async fn mock_task_status_times(&self, task_id: &str, status: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cis/tasks/{}", task_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_task_status(&self, task_id: &str, status: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cis/tasks/{}", task_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_task_failed(&self, task_id: &str, message: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cis/tasks/{}", task_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "FAILED",
                "error": { "message": message }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_task_status_error(&self, task_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cis/tasks/{}", task_id)))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far whose path starts with `prefix`
    pub async fn requests_to(&self, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with(prefix))
            .count()
    }
}
