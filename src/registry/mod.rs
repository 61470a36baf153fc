//! Registry clients for looking up the latest published version
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - One client per manifest dialect (PyPI, RubyGems, crates.io, npms.io, Packagist)

mod client;
mod crates_io;
mod npm;
mod packagist;
mod pypi;
mod rubygems;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use crates_io::CratesIoClient;
pub use npm::NpmsClient;
pub use packagist::PackagistClient;
pub use pypi::PyPIClient;
pub use rubygems::RubyGemsClient;

use crate::domain::Dialect;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Looks up the latest version of a package by name
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Wait until the registry accepts another request.
    ///
    /// Callers await this before [`RegistryClient::fetch_latest`] so that
    /// queueing behind a rate limit is not counted against a lookup timeout.
    async fn throttle(&self) {}

    /// Fetch the latest published version of a package
    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError>;
}

/// Create the registry client for the given dialect
pub fn create_client(dialect: Dialect, client: HttpClient) -> Box<dyn RegistryClient> {
    match dialect {
        Dialect::Pip => Box::new(PyPIClient::new(client)),
        Dialect::Gem => Box::new(RubyGemsClient::new(client)),
        Dialect::Crate => Box::new(CratesIoClient::new(client)),
        Dialect::Npm => Box::new(NpmsClient::new(client)),
        Dialect::Composer => Box::new(PackagistClient::new(client)),
    }
}
