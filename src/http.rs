//! HTTP transport used by the weather and completion clients
//!
//! The clients only need two verbs with a per-call deadline, so they talk to
//! an [`HttpTransport`] instead of `reqwest` directly. Tests swap in a
//! scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Build a response from parts
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is exactly 200 OK
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the body does not deserialize into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal HTTP client surface
///
/// Implementations report an elapsed deadline as [`Error::Timeout`] and an
/// unreachable host as [`Error::Network`], so callers can tell them apart
/// from other transport failures.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;

    /// POST a JSON body with bearer authorization
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn finish(
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(e, timeout))?;
        tracing::trace!(status, bytes = body.len(), "http response");

        Ok(HttpResponse { status, body })
    }
}

fn classify(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout(timeout)
    } else if e.is_connect() {
        Error::Network(e.to_string())
    } else {
        Error::Http(e)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        tracing::debug!(url, ?timeout, "GET");
        Self::finish(self.client.get(url), timeout).await
    }

    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        tracing::debug!(url, ?timeout, "POST");
        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {bearer}"))
            .json(body);
        Self::finish(request, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_is_ok() {
        assert!(HttpResponse::new(200, "").is_ok());
        assert!(!HttpResponse::new(201, "").is_ok());
        assert!(!HttpResponse::new(429, "").is_ok());
    }

    #[test]
    fn json_body_parses() {
        let response = HttpResponse::new(200, r#"{"value": 3}"#);
        let parsed: serde_json::Value = response.json().unwrap();
        assert_eq!(parsed["value"], 3);
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let response = HttpResponse::new(200, "not json");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let transport = ReqwestTransport::new();
        let result = transport
            .get("http://127.0.0.1:1/", Duration::from_secs(2))
            .await;
        assert!(matches!(result, Err(Error::Network(_))), "{result:?}");
    }
}
