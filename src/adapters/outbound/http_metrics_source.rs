//! HTTP Metrics Source
//!
//! Implements MetricsSource against the engine's `/metrics` endpoint using
//! a bearer token. No request timeout is set; the transport decides.

use crate::domain::entities::MetricsSnapshot;
use crate::domain::ports::{FetchError, MetricsSource};
use async_trait::async_trait;
use std::fmt;

/// Fetches snapshots over HTTP.
pub struct HttpMetricsSource {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpMetricsSource {
    /// Create a source for `url` authenticating with `token`.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, url, token))
    }

    /// Create a source reusing an existing client.
    pub fn with_client(
        client: reqwest::Client,
        url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for HttpMetricsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetricsSource")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self) -> Result<MetricsSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        // Read the body first so a bad payload is reported as Decode, not Transport.
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
