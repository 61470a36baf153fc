//! npms.io client
//!
//! API endpoint: https://api.npms.io/v2/package/{package}
//!
//! The latest version is read from `collected.metadata.version`. Scoped
//! package names (`@scope/name`) have their slash percent-encoded.

use crate::domain::Dialect;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;

/// npms.io API base URL
const NPMS_BASE_URL: &str = "https://api.npms.io";

/// npms.io client
pub struct NpmsClient {
    client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NpmsResponse {
    collected: Collected,
}

#[derive(Debug, Deserialize)]
struct Collected {
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    version: String,
}

impl NpmsClient {
    /// Create a new npms.io client
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, NPMS_BASE_URL)
    }

    /// Create a client against another npms-compatible API
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package, `@types/node` -> `@types%2Fnode`
    fn build_url(&self, package: &str) -> String {
        format!(
            "{}/v2/package/{}",
            self.base_url,
            package.replace('/', "%2F")
        )
    }
}

#[async_trait]
impl RegistryClient for NpmsClient {
    fn registry_name(&self) -> &'static str {
        Dialect::Npm.registry_name()
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        let url = self.build_url(package);
        let response: NpmsResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;
        Ok(response.collected.metadata.version)
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
        let adapter = NpmsClient::new(client());
        assert_eq!(
            adapter.build_url("lodash"),
            "https://api.npms.io/v2/package/lodash"
        );
        assert_eq!(
            adapter.build_url("@types/node"),
            "https://api.npms.io/v2/package/@types%2Fnode"
        );
    }

    #[tokio::test]
    async fn test_fetch_latest() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/package/lodash")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "analyzedAt": "2024-01-01T00:00:00.000Z",
                    "collected": {
                        "metadata": {"name": "lodash", "version": "4.17.21"}
                    }
                }"#,
            )
            .create_async()
            .await;

        let npms = NpmsClient::with_base_url(client(), &server.url());
        assert_eq!(npms.fetch_latest("lodash").await.unwrap(), "4.17.21");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_latest_scoped_package() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/package/@types%2Fnode")
            .with_status(200)
            .with_body(r#"{"collected": {"metadata": {"version": "20.11.0"}}}"#)
            .create_async()
            .await;

        let npms = NpmsClient::with_base_url(client(), &server.url());
        assert_eq!(npms.fetch_latest("@types/node").await.unwrap(), "20.11.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_latest_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v2/package/nonexistent-package")
            .with_status(404)
            .with_body(r#"{"code": "NOT_FOUND"}"#)
            .create_async()
            .await;

        let npms = NpmsClient::with_base_url(client(), &server.url());
        let result = npms.fetch_latest("nonexistent-package").await;
        assert!(matches!(result, Err(RegistryError::PackageNotFound { .. })));
    }
}
