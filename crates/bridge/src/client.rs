//! HTTP transport to the Revit Routes API.
//!
//! Three call shapes: [`RevitClient::get`] (query params), [`RevitClient::post`]
//! (JSON body), and [`RevitClient::post_binary`] (JSON body, raw bytes back,
//! used for view image export). Each takes an optional per-call timeout;
//! [`DEFAULT_TIMEOUT`] applies when none is given.

use std::time::Duration;

use mcp::Context;
use serde_json::Value;
use thiserror::Error;

/// Default timeout for backend calls. Individual tools override it upward
/// for known-slow operations (code execution, batch placement).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failure. Rendered as plain text at the handler boundary;
/// never propagated past a tool invocation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Raw bytes returned by a binary endpoint.
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Client for the Revit automation HTTP API.
///
/// Cheap to clone behind an `Arc`; holds no per-call state.
#[derive(Debug)]
pub struct RevitClient {
    http: reqwest::Client,
    base_url: String,
}

impl RevitClient {
    /// Create a client for the given base URL (trailing slash optional).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET an endpoint, optionally with query parameters.
    ///
    /// A 2xx body that is not valid JSON degrades to a plain string value so
    /// the normalizer's passthrough rule applies.
    pub async fn get(
        &self,
        path: &str,
        ctx: &Context,
        params: Option<&[(&str, String)]>,
        timeout: Option<Duration>,
    ) -> Result<Value, ClientError> {
        let mut request = self
            .http
            .get(self.url(path))
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));
        if let Some(params) = params {
            request = request.query(params);
        }
        self.dispatch_json(path, request, ctx).await
    }

    /// POST a JSON payload to an endpoint.
    pub async fn post(
        &self,
        path: &str,
        payload: &Value,
        ctx: &Context,
        timeout: Option<Duration>,
    ) -> Result<Value, ClientError> {
        let request = self
            .http
            .post(self.url(path))
            .json(payload)
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));
        self.dispatch_json(path, request, ctx).await
    }

    /// POST a JSON payload and return the raw response bytes (image export).
    pub async fn post_binary(
        &self,
        path: &str,
        payload: &Value,
        ctx: &Context,
        timeout: Option<Duration>,
    ) -> Result<BinaryResponse, ClientError> {
        let request = self
            .http
            .post(self.url(path))
            .json(payload)
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                ctx.error(format!("Request to {path} failed: {e}"));
                return Err(e.into());
            }
        };

        let status = response.status();
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            ctx.error(format!("Request to {path} returned HTTP {status}"));
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data = response.bytes().await?.to_vec();
        Ok(BinaryResponse { data, mime_type })
    }

    async fn dispatch_json(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
        ctx: &Context,
    ) -> Result<Value, ClientError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                ctx.error(format!("Request to {path} failed: {e}"));
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            ctx.error(format!("Request to {path} returned HTTP {status}"));
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // pyRevit routes normally answers JSON, but degraded backends can
        // emit bare text; surface it as a string for the normalizer.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = RevitClient::new("http://localhost:48884/revit_mcp_api/");
        assert_eq!(client.base_url(), "http://localhost:48884/revit_mcp_api");
        assert_eq!(
            client.url("/status/"),
            "http://localhost:48884/revit_mcp_api/status/"
        );
    }
}
