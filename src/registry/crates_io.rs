//! crates.io API client
//!
//! API endpoint: https://crates.io/api/v1/crates/{crate}
//!
//! Note: crates.io requires a User-Agent header (handled by HttpClient)
//! and has rate limiting (1 request/second), enforced in `throttle`.

use crate::domain::Dialect;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// crates.io base URL
const CRATES_IO_BASE_URL: &str = "https://crates.io";

/// Rate limit: 1 request per second
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

/// crates.io client with rate limiting
pub struct CratesIoClient {
    client: HttpClient,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

/// crates.io crate response
#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    newest_version: String,
}

impl CratesIoClient {
    /// Create a new crates.io client
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, CRATES_IO_BASE_URL)
    }

    /// Create a client against another registry API
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: Mutex::new(None),
        }
    }

    /// Build the URL for a crate
    fn build_url(&self, crate_name: &str) -> String {
        format!("{}/api/v1/crates/{}", self.base_url, crate_name)
    }

}

#[async_trait]
impl RegistryClient for CratesIoClient {
    fn registry_name(&self) -> &'static str {
        Dialect::Crate.registry_name()
    }

    /// Holding the lock while sleeping serializes callers
    async fn throttle(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(elapsed) = last_request.map(|t| t.elapsed()) {
            if elapsed < RATE_LIMIT_INTERVAL {
                tokio::time::sleep(RATE_LIMIT_INTERVAL - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    async fn fetch_latest(&self, crate_name: &str) -> Result<String, RegistryError> {
        let url = self.build_url(crate_name);
        let response: CratesIoResponse = self
            .client
            .get_json(&url, crate_name, self.registry_name())
            .await?;

        Ok(response.krate.newest_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client() -> HttpClient {
        HttpClient::new().unwrap().with_max_retries(0)
    }

    #[test]
    fn test_build_url() {
        let adapter = CratesIoClient::new(client());
        assert_eq!(
            adapter.build_url("serde_json"),
            "https://crates.io/api/v1/crates/serde_json"
        );
    }

    #[test]
    fn test_rate_limit_constants() {
        assert_eq!(RATE_LIMIT_INTERVAL, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fetch_latest() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/crates/serde")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "crate": {"id": "serde", "max_version": "1.0.219", "newest_version": "1.0.219"},
                    "versions": []
                }"#,
            )
            .create_async()
            .await;

        let crates = CratesIoClient::with_base_url(client(), &server.url());
        assert_eq!(crates.fetch_latest("serde").await.unwrap(), "1.0.219");
        mock.assert_async().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_spaces_requests() {
        let crates = CratesIoClient::new(client());
        crates.throttle().await;
        let start = Instant::now();
        crates.throttle().await;
        assert!(start.elapsed() >= RATE_LIMIT_INTERVAL);
    }
}
