//! RubyGems client
//!
//! API endpoint: https://rubygems.org/api/v1/gems/{gem}.json

use crate::domain::Dialect;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;

/// RubyGems base URL
const RUBYGEMS_BASE_URL: &str = "https://rubygems.org";

/// RubyGems client
pub struct RubyGemsClient {
    client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GemResponse {
    version: String,
}

impl RubyGemsClient {
    /// Create a new RubyGems client
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, RUBYGEMS_BASE_URL)
    }

    /// Create a client against another gem server
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a gem
    fn build_url(&self, gem: &str) -> String {
        format!("{}/api/v1/gems/{}.json", self.base_url, gem)
    }
}

#[async_trait]
impl RegistryClient for RubyGemsClient {
    fn registry_name(&self) -> &'static str {
        Dialect::Gem.registry_name()
    }

    async fn fetch_latest(&self, gem: &str) -> Result<String, RegistryError> {
        let url = self.build_url(gem);
        let response: GemResponse = self
            .client
            .get_json(&url, gem, self.registry_name())
            .await?;
        Ok(response.version)
    }
}
