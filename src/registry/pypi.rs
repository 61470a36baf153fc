//! PyPI JSON API client
//!
//! API endpoint: https://pypi.org/pypi/{package}/json
//!
//! The latest version is the greatest key of `releases` under version-key
//! ordering, not the most recently uploaded release.

use crate::domain::{latest_of, Dialect};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// PyPI API base URL
const PYPI_BASE_URL: &str = "https://pypi.org";

/// PyPI client
pub struct PyPIClient {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release files keyed by version
    releases: HashMap<String, serde_json::Value>,
}

impl PyPIClient {
    /// Create a new PyPI client
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_BASE_URL)
    }

    /// Create a client against another index (tests, mirrors)
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package)
    }
}

#[async_trait]
impl RegistryClient for PyPIClient {
    fn registry_name(&self) -> &'static str {
        Dialect::Pip.registry_name()
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        let url = self.build_url(package);
        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        debug!(package, releases = response.releases.len(), "PyPI releases");

        latest_of(response.releases.into_keys()).ok_or_else(|| {
            RegistryError::invalid_response(package, self.registry_name(), "no releases listed")
        })
    }
}
