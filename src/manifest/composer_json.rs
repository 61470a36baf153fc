//! composer.json adapter for PHP projects
//!
//! Reads the `require` object. Platform requirements (`php`, `ext-*`, ...)
//! are not Packagist packages; they are skipped and written back untouched.

use crate::domain::{Dialect, ManifestRecord};
use crate::error::ManifestError;
use crate::manifest::json_document::{DependencySection, JsonDocument};
use crate::manifest::{ensure_known, ManifestAdapter, ManifestOptions};

const REQUIRE: DependencySection = DependencySection {
    key: "require",
    skip: is_platform_requirement,
};

/// Returns true for requirements on the PHP runtime or its extensions
fn is_platform_requirement(name: &str) -> bool {
    name == "php"
        || name == "hhvm"
        || name.starts_with("php-")
        || name.starts_with("composer-")
        || name.starts_with("ext-")
        || name.starts_with("lib-")
}

/// Adapter for composer.json manifests
pub struct ComposerJsonAdapter {
    options: ManifestOptions,
    document: Option<JsonDocument>,
    tracked: Vec<String>,
}

impl ComposerJsonAdapter {
    /// Create a new composer.json adapter
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            document: None,
            tracked: Vec::new(),
        }
    }
}

impl ManifestAdapter for ComposerJsonAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Composer
    }

    fn options(&self) -> &ManifestOptions {
        &self.options
    }

    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut document = JsonDocument::parse(&self.options.path, content)?;
        let records = REQUIRE.read(&mut document, &self.options.ignore)?;

        self.tracked = records.iter().map(|r| r.name.clone()).collect();
        self.document = Some(document);
        Ok(records)
    }

    fn render(&mut self, records: &[ManifestRecord]) -> Result<String, ManifestError> {
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| ManifestError::NotLoaded {
                path: self.options.path.clone(),
            })?;

        let tracked = &self.tracked;
        ensure_known(&self.options.path, records, |name| {
            tracked.iter().any(|t| t == name)
        })?;

        REQUIRE.apply(document, records)?;
        document.render()
    }
}
