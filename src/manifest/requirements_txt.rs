//! requirements.txt adapter for pip
//!
//! Handles:
//! - One `name<op>version` requirement per line, `op` one of `==`, `>=`, `<=`
//! - Blank lines and `#` comments (skipped on read)
//!
//! Write-back rewrites every requirement as `name==latest`. Comments and the
//! original operator are not kept. Ignored packages keep their original line.

use crate::domain::{Dialect, ManifestRecord};
use crate::error::ManifestError;
use crate::manifest::{ensure_known, find_record, ManifestAdapter, ManifestOptions};
use regex::Regex;
use std::sync::LazyLock;

// The leftmost of the three operators splits name from version
static OPERATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<=|>=|==").unwrap());

/// A line kept between read and write-back
#[derive(Debug, Clone, PartialEq, Eq)]
enum RequirementLine {
    /// A looked-up requirement
    Requirement { name: String, version: String },
    /// An ignored requirement, written back verbatim
    Verbatim(String),
}

/// Adapter for pip requirements files
pub struct RequirementsAdapter {
    options: ManifestOptions,
    lines: Option<Vec<RequirementLine>>,
}

impl RequirementsAdapter {
    /// Create a new requirements adapter
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            lines: None,
        }
    }
}

impl ManifestAdapter for RequirementsAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Pip
    }

    fn options(&self) -> &ManifestOptions {
        &self.options
    }

    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut lines = Vec::new();
        let mut records = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let op = OPERATOR_RE.find(line).ok_or_else(|| {
                ManifestError::line_parse_error(
                    &self.options.path,
                    index + 1,
                    line,
                    "expected 'name==version', 'name>=version' or 'name<=version'",
                )
            })?;
            let name = line[..op.start()].trim();
            let version = line[op.end()..].trim();

            if name.is_empty() || version.is_empty() {
                return Err(ManifestError::line_parse_error(
                    &self.options.path,
                    index + 1,
                    line,
                    "missing package name or version",
                ));
            }

            if self.options.is_ignored(name) {
                lines.push(RequirementLine::Verbatim(raw.to_string()));
                continue;
            }

            records.push(ManifestRecord::new(
                name,
                format!("{}{}", op.as_str(), version),
                version,
            ));
            lines.push(RequirementLine::Requirement {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        self.lines = Some(lines);
        Ok(records)
    }

    fn render(&mut self, records: &[ManifestRecord]) -> Result<String, ManifestError> {
        let lines = self
            .lines
            .as_ref()
            .ok_or_else(|| ManifestError::NotLoaded {
                path: self.options.path.clone(),
            })?;

        ensure_known(&self.options.path, records, |name| {
            lines.iter().any(|line| {
                matches!(line, RequirementLine::Requirement { name: n, .. } if n == name)
            })
        })?;

        let mut output = String::new();
        for line in lines {
            match line {
                RequirementLine::Requirement { name, version } => {
                    let target = find_record(records, name)
                        .map(|r| r.target_version())
                        .unwrap_or(version);
                    output.push_str(&format!("{}=={}\n", name, target));
                }
                RequirementLine::Verbatim(raw) => {
                    output.push_str(raw);
                    output.push('\n');
                }
            }
        }

        Ok(output)
    }
}
