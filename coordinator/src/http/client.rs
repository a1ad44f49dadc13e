use reqwest::{redirect, Certificate, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::constants::http;
use crate::errors::RemoteError;

/// Certificate verification policy for a control-plane endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum TlsPolicy {
    /// Verify against the system trust store
    Verify,
    /// Accept any certificate
    Insecure,
    /// Verify against the system store plus this PEM bundle
    CaFile(PathBuf),
}

impl TlsPolicy {
    pub fn from_settings(insecure: bool, ca_file: Option<&str>) -> Self {
        match (insecure, ca_file) {
            (_, Some(path)) => TlsPolicy::CaFile(PathBuf::from(path)),
            (true, None) => TlsPolicy::Insecure,
            (false, None) => TlsPolicy::Verify,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: TlsPolicy,
    pub redirect_limit: usize,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            tls: TlsPolicy::Verify,
            redirect_limit: http::REDIRECT_LIMIT,
        }
    }
}

/// Shared reqwest wrapper: optional basic auth, bounded redirects, TLS
/// policy, and one error shape for every non-success response.
#[derive(Clone)]
pub struct HttpHelper {
    client: Client,
    username: Option<String>,
    password: Option<String>,
}

impl HttpHelper {
    pub fn new(options: HttpOptions) -> Result<Self, RemoteError> {
        let mut builder = Client::builder()
            .connect_timeout(http::CONNECT_TIMEOUT)
            .timeout(http::REQUEST_TIMEOUT)
            .redirect(redirect::Policy::limited(options.redirect_limit));

        builder = match &options.tls {
            TlsPolicy::Verify => builder,
            TlsPolicy::Insecure => builder.danger_accept_invalid_certs(true),
            TlsPolicy::CaFile(path) => {
                let pem = std::fs::read(path).map_err(|e| RemoteError::InvalidResponse {
                    endpoint: path.display().to_string(),
                    reason: format!("Failed to read CA file: {}", e),
                })?;
                let certificate =
                    Certificate::from_pem(&pem).map_err(|e| RemoteError::InvalidResponse {
                        endpoint: path.display().to_string(),
                        reason: format!("Invalid CA bundle: {}", e),
                    })?;
                builder.add_root_certificate(certificate)
            }
        };

        let client = builder.build().map_err(|e| RemoteError::ConnectionFailed {
            endpoint: "http client".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            username: options.username,
            password: options.password,
        })
    }

    /// Request builder with basic auth applied when credentials are set
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    /// Send a prepared request. Non-2xx responses become errors carrying
    /// `code=<status> message=<reason> body=<body>`.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(|e| {
            let endpoint = e.url().map(|u| u.to_string()).unwrap_or_default();
            let reason = if e.is_redirect() {
                "HTTP redirect too deep".to_string()
            } else {
                e.to_string()
            };
            warn!("HTTP request to {} failed: {}", endpoint, reason);
            RemoteError::ConnectionFailed { endpoint, reason }
        })?;

        let status = response.status();
        let url = response.url().to_string();
        debug!("{} <- {}", status, url);

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::AuthenticationFailed { endpoint: url });
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Rejected {
            url,
            status: status.as_u16(),
            message: format!(
                "code={} message={} body={}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                body
            ),
        })
    }

    pub async fn get(&self, url: &str) -> Result<Response, RemoteError> {
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response, RemoteError> {
        self.send(self.request(Method::POST, url).json(body)).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response, RemoteError> {
        self.send(self.request(Method::DELETE, url)).await
    }
}

/// Decode a JSON body, naming the endpoint on failure
pub async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let endpoint = response.url().to_string();
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse {
            endpoint,
            reason: e.to_string(),
        })
}

pub fn is_ip_address(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}
