use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::solarwinds;
use crate::errors::RemoteError;
use crate::http::client::{read_json, HttpHelper, HttpOptions, TlsPolicy};
use crate::http::is_ip_address;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrionNode {
    #[serde(rename = "NodeID")]
    pub node_id: i64,
    #[serde(rename = "Uri")]
    pub uri: String,
    #[serde(rename = "IPAddress", default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Option<Vec<Value>>,
}

/// SolarWinds Information Service (SWIS) REST client
pub struct OrionClient {
    http: HttpHelper,
    base_url: String,
}

impl OrionClient {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        ssl: bool,
        tls: TlsPolicy,
    ) -> Result<Self, RemoteError> {
        let scheme = if ssl { "https" } else { "http" };
        let http = HttpHelper::new(HttpOptions {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            tls,
            ..Default::default()
        })?;

        Ok(Self {
            http,
            base_url: format!(
                "{}://{}:{}/SolarWinds/InformationService/v3/Json",
                scheme, host, port
            ),
        })
    }

    /// Run a SWQL query; a response without `results` is an empty result.
    pub async fn query(&self, swql: &str, parameters: Value) -> Result<Vec<Value>, RemoteError> {
        let url = format!("{}/Query", self.base_url);
        let body = json!({
            "query": swql,
            "parameters": parameters,
        });
        let response: QueryResponse = read_json(self.http.post(&url, &body).await?).await?;
        Ok(response.results.unwrap_or_default())
    }

    pub async fn invoke(&self, entity: &str, verb: &str, body: &Value) -> Result<Value, RemoteError> {
        let url = format!("{}/Invoke/{}/{}", self.base_url, entity, verb);
        let text = self
            .http
            .post(&url, body)
            .await?
            .text()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        // Void verbs answer with an empty body
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse {
            endpoint: url,
            reason: e.to_string(),
        })
    }

    /// Nodes whose `IPAddress` (for IP targets) or `name_property` equals
    /// `hostname_or_ip`.
    pub async fn get_node(
        &self,
        hostname_or_ip: &str,
        name_property: &str,
    ) -> Result<Vec<OrionNode>, RemoteError> {
        let field = if is_ip_address(hostname_or_ip) {
            "IPAddress"
        } else {
            name_property
        };

        let mut fields = vec!["NodeID", "Uri", "IPAddress"];
        if !fields.contains(&name_property) {
            fields.push(name_property);
        }

        let swql = format!(
            "SELECT {} FROM Orion.Nodes WHERE {}=@query_on",
            fields.join(","),
            field
        );
        debug!("Orion lookup: {}", swql);

        let endpoint = format!("{}/Query", self.base_url);
        self.query(&swql, json!({ "query_on": hostname_or_ip }))
            .await?
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| RemoteError::InvalidResponse {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    pub async fn suppress_alerts(&self, uris: &[String]) -> Result<Value, RemoteError> {
        self.invoke(solarwinds::SUPPRESSION_ENTITY, "SuppressAlerts", &json!([uris]))
            .await
    }

    pub async fn resume_alerts(&self, uris: &[String]) -> Result<Value, RemoteError> {
        self.invoke(solarwinds::SUPPRESSION_ENTITY, "ResumeAlerts", &json!([uris]))
            .await
    }
}
