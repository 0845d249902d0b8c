//! HTTP fetch port for HTTP challenge checks.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};

/// Fetches challenge documents over HTTP.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Body of a successful GET to `url`. Non-2xx responses are errors.
    async fn fetch_body(&self, url: &str) -> CoreResult<String>;
}

/// Fetcher backed by a shared `reqwest` client.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with challenge-appropriate timeouts.
    ///
    /// # Panics
    ///
    /// Panics only if the TLS backend cannot be initialized, which is a
    /// build configuration error.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch_body(&self, url: &str) -> CoreResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::ValidationError(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::ValidationError(format!(
                "GET {url} returned {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CoreError::ValidationError(format!("reading body of {url} failed: {e}")))
    }
}
