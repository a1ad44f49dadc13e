//! Mock Alertmanager v2 API

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use coordinator::monitoring::AlertmanagerClient;

pub struct MockAlertmanagerServer {
    pub server: MockServer,
}

impl MockAlertmanagerServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn host(&self) -> String {
        self.server.address().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    pub fn client(&self) -> AlertmanagerClient {
        AlertmanagerClient::new(&self.host(), self.port()).expect("Failed to build client")
    }

    /// Any silence creation succeeds with `silence_id`
    pub async fn mock_create_success(&self, silence_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v2/silences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "silenceID": silence_id })))
            .mount(&self.server)
            .await;
    }

    /// Creation for `target` is rejected; mount before the catch-all success
    pub async fn mock_create_rejected_for(&self, target: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v2/silences"))
            .and(body_partial_json(json!({
                "matchers": [{ "name": "alias", "value": target, "isRegex": false }]
            })))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad matcher"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_list(&self, silences: Value) {
        Mock::given(method("GET"))
            .and(path("/api/v2/silences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(silences))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_list_unavailable(&self) {
        Mock::given(method("GET"))
            .and(path("/api/v2/silences"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete(&self, silence_id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v2/silence/{}", silence_id)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn received(&self, http_method: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method)
            .collect()
    }
}

/// Silence as listed by Alertmanager
pub fn silence(id: &str, alias: &str, state: &str, created_by: &str) -> Value {
    json!({
        "id": id,
        "status": { "state": state },
        "createdBy": created_by,
        "comment": format!("Silencing alerts on {} for patching", alias),
        "startsAt": "2026-10-19T20:00:00Z",
        "endsAt": "2026-10-19T22:00:00Z",
        "matchers": [{ "name": "alias", "value": alias, "isRegex": false }]
    })
}
