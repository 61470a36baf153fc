//! Manifest reading and format-preserving write-back
//!
//! Every dialect decodes its manifest into the same `ManifestRecord` stream
//! and keeps the decoded document for the lifetime of one run, so that
//! write-back only touches the version fields that changed:
//! - pip requirements (`requirements.txt`)
//! - Ruby `Gemfile`
//! - `Cargo.toml` (via toml_edit)
//! - `package.json` and `composer.json` (via a retained JSON tree)

mod cargo_toml;
mod composer_json;
mod gemfile;
mod json_document;
mod package_json;
mod requirements_txt;

pub use cargo_toml::CargoTomlAdapter;
pub use composer_json::ComposerJsonAdapter;
pub use gemfile::GemfileAdapter;
pub use json_document::JsonDocument;
pub use package_json::PackageJsonAdapter;
pub use requirements_txt::RequirementsAdapter;

use crate::domain::{Dialect, ManifestRecord};
use crate::error::ManifestError;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-run configuration shared by every adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Manifest to read
    pub path: PathBuf,
    /// Package names excluded from lookup and write-back (exact match)
    pub ignore: BTreeSet<String>,
    /// Write back to `path` instead of the scratch directory
    pub overwrite: bool,
}

impl ManifestOptions {
    /// Create options for a manifest path, no ignore list, no overwrite
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ignore: BTreeSet::new(),
            overwrite: false,
        }
    }

    /// Set the ignore list (builder pattern)
    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set overwrite mode (builder pattern)
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Check whether a package is on the ignore list
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.contains(name)
    }

    /// Where write-back goes: the manifest itself when overwriting,
    /// otherwise the same file name inside the system temp directory
    pub fn destination(&self) -> PathBuf {
        if self.overwrite {
            return self.path.clone();
        }
        let file_name = self
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("manifest"));
        std::env::temp_dir().join(file_name)
    }

    /// Log the ignore list once per read
    fn log_ignored(&self) {
        if !self.ignore.is_empty() {
            info!(packages = ?self.ignore, "Ignoring packages");
        }
    }
}

/// Capability shared by every manifest dialect
///
/// Implementors provide `parse` and `render` over in-memory text; reading the
/// file, choosing the destination and writing it are provided on top.
pub trait ManifestAdapter: Send {
    /// Dialect handled by this adapter
    fn dialect(&self) -> Dialect;

    /// Options this adapter was created with
    fn options(&self) -> &ManifestOptions;

    /// Decode manifest text, retain the decoded form and return its records.
    /// Ignored packages are dropped here, before any comparison happens.
    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError>;

    /// Re-encode the retained document with each record's target version
    fn render(&mut self, records: &[ManifestRecord]) -> Result<String, ManifestError>;

    /// Read and decode the manifest file
    fn read(&mut self) -> Result<Vec<ManifestRecord>, ManifestError> {
        let path = self.options().path.clone();
        let content = read_manifest(&path)?;
        self.options().log_ignored();
        let records = self.parse(&content)?;
        debug!(path = %path.display(), count = records.len(), "Read manifest");
        Ok(records)
    }

    /// Path write-back will go to
    fn resolve_destination(&self) -> PathBuf {
        self.options().destination()
    }

    /// Render the records and write them to the destination
    fn write_back(&mut self, records: &[ManifestRecord]) -> Result<PathBuf, ManifestError> {
        let content = self.render(records)?;
        let destination = self.resolve_destination();
        write_manifest(&destination, &content)?;
        info!(destination = %destination.display(), "Wrote manifest");
        Ok(destination)
    }
}

/// Create the adapter for a dialect
pub fn create_adapter(dialect: Dialect, options: ManifestOptions) -> Box<dyn ManifestAdapter> {
    match dialect {
        Dialect::Pip => Box::new(RequirementsAdapter::new(options)),
        Dialect::Gem => Box::new(GemfileAdapter::new(options)),
        Dialect::Crate => Box::new(CargoTomlAdapter::new(options)),
        Dialect::Npm => Box::new(PackageJsonAdapter::new(options)),
        Dialect::Composer => Box::new(ComposerJsonAdapter::new(options)),
    }
}

/// Read a manifest file content
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}

/// Fail if any record names a package the adapter never loaded
fn ensure_known(
    path: &Path,
    records: &[ManifestRecord],
    mut is_known: impl FnMut(&str) -> bool,
) -> Result<(), ManifestError> {
    match records.iter().find(|r| !is_known(&r.name)) {
        Some(unknown) => Err(ManifestError::inconsistent_record(path, &unknown.name)),
        None => Ok(()),
    }
}

/// Find the record for a package name
fn find_record<'a>(records: &'a [ManifestRecord], name: &str) -> Option<&'a ManifestRecord> {
    records.iter().find(|r| r.name == name)
}
