//! Mock SolarWinds Information Service

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use coordinator::http::TlsPolicy;
use coordinator::monitoring::OrionClient;

const BASE_PATH: &str = "/SolarWinds/InformationService/v3/Json";

pub struct MockOrionServer {
    pub server: MockServer,
}

impl MockOrionServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn client(&self) -> OrionClient {
        let address = self.server.address();
        OrionClient::new(
            &address.ip().to_string(),
            address.port(),
            "orion-user",
            "orion-pass",
            false,
            TlsPolicy::Verify,
        )
        .expect("Failed to build client")
    }

    /// Lookup of `target` returns `rows`
    pub async fn mock_nodes(&self, target: &str, rows: Value) {
        Mock::given(method("POST"))
            .and(path(format!("{}/Query", BASE_PATH)))
            .and(body_partial_json(json!({ "parameters": { "query_on": target } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": rows })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_query_unauthorized(&self) {
        Mock::given(method("POST"))
            .and(path(format!("{}/Query", BASE_PATH)))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_invoke(&self, verb: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("{}/Invoke/Orion.AlertSuppression/{}", BASE_PATH, verb)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn received_bodies(&self, suffix: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path().ends_with(suffix))
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }
}

pub fn orion_node(node_id: i64, ip: &str) -> Value {
    json!({
        "NodeID": node_id,
        "Uri": format!("swis://orion/Orion/Orion.Nodes/NodeID={}", node_id),
        "IPAddress": ip,
    })
}
