//! The uniform dependency record shared by every manifest dialect

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::version_key::compare_versions;

/// A single `{name, version}` entry of a manifest
///
/// Created by an adapter's read with no latest version, filled by the
/// sync engine after the registry lookup and consumed by write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Package name as written in the manifest
    pub name: String,
    /// Version constraint exactly as written (`^1.4`, `~> 6.0`, `1.0.0`)
    pub current_spec: String,
    /// Version used for comparison, range operators stripped
    pub current_version: String,
    /// Latest published version, once looked up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
}

impl ManifestRecord {
    /// Creates a record that has not been looked up yet
    pub fn new(
        name: impl Into<String>,
        current_spec: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_spec: current_spec.into(),
            current_version: current_version.into(),
            latest_version: None,
        }
    }

    /// Sets the latest version (builder pattern)
    pub fn with_latest(mut self, latest: impl Into<String>) -> Self {
        self.latest_version = Some(latest.into());
        self
    }

    /// Ordering of current against latest; `None` before lookup
    pub fn compare_to_latest(&self) -> Option<Ordering> {
        self.latest_version
            .as_deref()
            .map(|latest| compare_versions(&self.current_version, latest))
    }

    /// Returns true if the current version is strictly behind latest
    pub fn is_outdated(&self) -> bool {
        self.compare_to_latest() == Some(Ordering::Less)
    }

    /// Version that write-back should emit: latest if known, else current
    pub fn target_version(&self) -> &str {
        self.latest_version
            .as_deref()
            .unwrap_or(&self.current_version)
    }

    /// Returns true if write-back would change the version text
    pub fn needs_rewrite(&self) -> bool {
        self.target_version() != self.current_version
    }

    /// Constraint with the current version swapped for the target version,
    /// keeping the range operator in front of it (`^1.0` -> `^1.4`)
    pub fn rewritten_spec(&self) -> String {
        let operator = self
            .current_spec
            .strip_suffix(self.current_version.as_str())
            .unwrap_or("");
        format!("{}{}", operator, self.target_version())
    }
}

impl fmt::Display for ManifestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.latest_version {
            Some(latest) => write!(f, "{}: {} => {}", self.name, self.current_version, latest),
            None => write!(f, "{}: {}", self.name, self.current_version),
        }
    }
}

/// Range operators that may lead a constraint (`^1.2`, `~1.2`, `=1.2`, `>= 1.2`)
pub const RANGE_OPERATORS: &[char] = &['^', '~', '=', '>', '<'];

/// Strips any leading characters in `operators` from a constraint
pub fn strip_range_prefix<'a>(spec: &'a str, operators: &[char]) -> &'a str {
    spec.trim_start_matches(|c: char| operators.contains(&c) || c.is_whitespace())
}
