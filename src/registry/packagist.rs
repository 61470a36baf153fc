//! Packagist client
//!
//! API endpoint: https://repo.packagist.org/p2/{vendor}/{package}.json
//!
//! The `p2` metadata lists tagged releases only. Tags are often written with
//! a leading `v`, which is dropped before ordering and in the returned value.

use crate::domain::{latest_of, Dialect};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Packagist repository base URL
const PACKAGIST_BASE_URL: &str = "https://repo.packagist.org";

/// Packagist client
pub struct PackagistClient {
    client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PackagistResponse {
    packages: HashMap<String, Vec<PackageVersion>>,
}

#[derive(Debug, Deserialize)]
struct PackageVersion {
    version: String,
}

impl PackagistClient {
    /// Create a new Packagist client
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PACKAGIST_BASE_URL)
    }

    /// Create a client against another Composer repository
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package; names are `vendor/package`
    fn build_url(&self, package: &str) -> String {
        format!("{}/p2/{}.json", self.base_url, package)
    }
}

#[async_trait]
impl RegistryClient for PackagistClient {
    fn registry_name(&self) -> &'static str {
        Dialect::Composer.registry_name()
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        let url = self.build_url(package);
        let mut response: PackagistResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let versions = response.packages.remove(package).ok_or_else(|| {
            RegistryError::invalid_response(
                package,
                self.registry_name(),
                "package missing from response",
            )
        })?;

        let stripped = versions.into_iter().map(|v| match v.version.strip_prefix('v') {
            Some(rest) => rest.to_string(),
            None => v.version,
        });

        latest_of(stripped).ok_or_else(|| {
            RegistryError::invalid_response(package, self.registry_name(), "no versions listed")
        })
    }
}
