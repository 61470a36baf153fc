//! package.json adapter for Node.js projects
//!
//! Reads the `dependencies` object. A leading range operator (`^`, `~`, `=`,
//! `>=`) is stripped for comparison and kept when the constraint is rewritten.

use crate::domain::{Dialect, ManifestRecord};
use crate::error::ManifestError;
use crate::manifest::json_document::{DependencySection, JsonDocument};
use crate::manifest::{ensure_known, ManifestAdapter, ManifestOptions};

const DEPENDENCIES: DependencySection = DependencySection {
    key: "dependencies",
    skip: |_| false,
};

/// Adapter for package.json manifests
pub struct PackageJsonAdapter {
    options: ManifestOptions,
    document: Option<JsonDocument>,
    tracked: Vec<String>,
}

impl PackageJsonAdapter {
    /// Create a new package.json adapter
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            document: None,
            tracked: Vec::new(),
        }
    }
}

impl ManifestAdapter for PackageJsonAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Npm
    }

    fn options(&self) -> &ManifestOptions {
        &self.options
    }

    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut document = JsonDocument::parse(&self.options.path, content)?;
        let records = DEPENDENCIES.read(&mut document, &self.options.ignore)?;

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

        DEPENDENCIES.apply(document, records)?;
        document.render()
    }
}
