//! Outbound HTTP to workers: forwarding and health probing.
//!
//! `axum`/`hyper` already give us idiomatic framing on the inbound side; this
//! module is a thin `reqwest::Client` wrapper with explicit dial/read
//! deadlines for the outbound direction.

use std::time::Duration;

use dispatch_core::{DispatchError, WorkerRequest, WorkerResponse};
use url::form_urlencoded;

#[derive(Clone)]
pub struct WorkerClient {
    http: reqwest::Client,
}

impl WorkerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn build_url(address: &str, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("http://{address}{path}");
        if !query.is_empty() {
            let encoded: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    /// Forward a request to `address` and return its raw response, with an
    /// explicit read timeout.
    pub async fn forward(
        &self,
        address: &str,
        request: &WorkerRequest,
        read_timeout: Duration,
    ) -> Result<WorkerResponse, DispatchError> {
        let url = Self::build_url(address, &request.path, &request.query);

        let mut builder = match request.method {
            "GET" => self.http.get(&url),
            "POST" => self.http.post(&url),
            other => {
                return Err(DispatchError::MalformedRequest(format!(
                    "unsupported outbound method {other}"
                )))
            }
        };

        builder = builder.timeout(read_timeout);

        if let Some(ct) = request.content_type {
            builder = builder.header("Content-Type", ct);
            builder = builder.header("Connection", "close");
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::WorkerTimeout
            } else {
                DispatchError::WorkerUnreachable(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();
        let body = resp
            .bytes()
            .await
            .map_err(|e| DispatchError::WorkerProtocolError(e.to_string()))?;

        Ok(WorkerResponse {
            status,
            content_type,
            body,
        })
    }

    /// `GET /ping` health probe: healthy iff the status line is exactly
    /// `200 OK`.
    pub async fn probe(&self, address: &str, timeout: Duration) -> bool {
        let url = format!("http://{address}/ping");
        match self.http.get(&url).timeout(timeout).send().await {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(_) => false,
        }
    }
}

impl Default for WorkerClient {
    fn default() -> Self {
        Self::new()
    }
}
