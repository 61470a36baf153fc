//! Cargo.toml adapter for Rust projects
//!
//! Handles the `[dependencies]` table in all three shapes:
//! - `serde = "1.0"`
//! - `serde = { version = "1.0", features = ["derive"] }`
//! - `[dependencies.serde]` sub-tables
//!
//! Range operators (`^`, `~`, `=`, `>=`, `<`) are stripped for comparison
//! and kept on write. The document is kept as a `toml_edit::DocumentMut`, so
//! comments, key order and sibling keys survive write-back untouched.

use crate::domain::{strip_range_prefix, Dialect, ManifestRecord, RANGE_OPERATORS};
use crate::error::ManifestError;
use crate::manifest::{ensure_known, ManifestAdapter, ManifestOptions};
use toml_edit::{DocumentMut, Item, Value};
use tracing::warn;

const SECTION: &str = "dependencies";

/// Adapter for Cargo.toml manifests
pub struct CargoTomlAdapter {
    options: ManifestOptions,
    document: Option<DocumentMut>,
    tracked: Vec<String>,
}

impl CargoTomlAdapter {
    /// Create a new Cargo.toml adapter
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            document: None,
            tracked: Vec::new(),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ManifestError {
        ManifestError::invalid_section(&self.options.path, SECTION, message)
    }

    /// Version constraint of one dependency, `None` for path/git/workspace entries
    fn dependency_spec(&self, name: &str, item: &Item) -> Result<Option<String>, ManifestError> {
        if let Some(value) = item.as_value().filter(|v| !v.is_inline_table()) {
            return match value.as_str() {
                Some(spec) => Ok(Some(spec.to_string())),
                None => Err(self.invalid(format!(
                    "dependency '{}' must be a version string or a table",
                    name
                ))),
            };
        }

        let table = item.as_table_like().ok_or_else(|| {
            self.invalid(format!(
                "dependency '{}' must be a version string or a table",
                name
            ))
        })?;

        match table.get("version") {
            Some(version) => version
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.invalid(format!("version of '{}' must be a string", name))),
            None => Ok(None),
        }
    }
}

impl ManifestAdapter for CargoTomlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Crate
    }

    fn options(&self) -> &ManifestOptions {
        &self.options
    }

    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut document = content
            .parse::<DocumentMut>()
            .map_err(|e| ManifestError::toml_parse_error(&self.options.path, e.to_string()))?;

        let mut records = Vec::new();
        let mut tracked = Vec::new();

        if let Some(section) = document.get_mut(SECTION) {
            let table = section
                .as_table_like_mut()
                .ok_or_else(|| self.invalid("expected a table"))?;

            for name in &self.options.ignore {
                table.remove(name);
            }

            for (name, item) in table.iter() {
                let Some(spec) = self.dependency_spec(name, item)? else {
                    warn!(package = name, "Skipping dependency without a registry version");
                    continue;
                };
                let current = strip_range_prefix(&spec, RANGE_OPERATORS).to_string();
                records.push(ManifestRecord::new(name, spec, current));
                tracked.push(name.to_string());
            }
        }

        self.document = Some(document);
        self.tracked = tracked;
        Ok(records)
    }

    fn render(&mut self, records: &[ManifestRecord]) -> Result<String, ManifestError> {
        let path = self.options.path.clone();
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| ManifestError::NotLoaded { path: path.clone() })?;

        let tracked = &self.tracked;
        ensure_known(&path, records, |name| tracked.iter().any(|t| t == name))?;

        if let Some(table) = document
            .get_mut(SECTION)
            .and_then(|section| section.as_table_like_mut())
        {
            for record in records {
                if !record.needs_rewrite() {
                    continue;
                }
                let new_spec = record.rewritten_spec();

                let value = match table.get_mut(&record.name) {
                    Some(item) if item.is_str() => item.as_value_mut(),
                    Some(item) => item
                        .as_table_like_mut()
                        .and_then(|t| t.get_mut("version"))
                        .and_then(|v| v.as_value_mut()),
                    None => None,
                };

                match value {
                    Some(value) => replace_keeping_decor(value, new_spec),
                    None => return Err(ManifestError::inconsistent_record(&path, &record.name)),
                }
            }
        }

        Ok(document.to_string())
    }
}

/// Replace a value but keep the whitespace and comments around it
fn replace_keeping_decor(value: &mut Value, new_value: String) {
    let decor = value.decor().clone();
    *value = Value::from(new_value);
    *value.decor_mut() = decor;
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[package]
name = "demo"
version = "0.1.0"

[dependencies]
# serialization
serde = { version = "1.0", features = ["derive"] }
tokio = "^1.28.0"  # runtime
local = { path = "../local" }

[dependencies.regex]
version = "1.10"
default-features = false

[dev-dependencies]
tempfile = "3"
"#;

    fn adapter() -> CargoTomlAdapter {
        CargoTomlAdapter::new(ManifestOptions::new("Cargo.toml"))
    }

    #[test]
    fn test_parse_dependency_shapes() {
        let records = adapter().parse(MANIFEST).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["serde", "tokio", "regex"]);

        assert_eq!(records[0].current_spec, "1.0");
        assert_eq!(records[1].current_spec, "^1.28.0");
        assert_eq!(records[1].current_version, "1.28.0");
        assert_eq!(records[2].current_version, "1.10");
    }

    #[test]
    fn test_round_trip_without_changes_is_exact() {
        let mut adapter = adapter();
        let records = adapter.parse(MANIFEST).unwrap();
        assert_eq!(adapter.render(&records).unwrap(), MANIFEST);
    }

    #[test]
    fn test_render_updates_only_versions() {
        let mut adapter = adapter();
        let records: Vec<_> = adapter
            .parse(MANIFEST)
            .unwrap()
            .into_iter()
            .map(|r| match r.name.as_str() {
                "serde" => r.with_latest("1.0.219"),
                "tokio" => r.with_latest("1.49.0"),
                _ => r.with_latest("1.12.2"),
            })
            .collect();

        let output = adapter.render(&records).unwrap();
        let expected = MANIFEST
            .replace(
                r#"serde = { version = "1.0","#,
                r#"serde = { version = "1.0.219","#,
            )
            .replace(r#"tokio = "^1.28.0"  # runtime"#, r#"tokio = "^1.49.0"  # runtime"#)
            .replace(r#"version = "1.10""#, r#"version = "1.12.2""#);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_exact_and_tilde_requirements() {
        let content = "[dependencies]\nserde = \"=1.0.100\"\nrand = { version = \"~0.7\" }\n";
        let mut adapter = adapter();
        let records: Vec<_> = adapter
            .parse(content)
            .unwrap()
            .into_iter()
            .map(|r| r.with_latest("1.0.200"))
            .collect();

        assert_eq!(records[0].current_version, "1.0.100");
        assert_eq!(records[1].current_version, "0.7");
        assert!(records.iter().all(|r| r.is_outdated()));
        assert_eq!(
            adapter.render(&records).unwrap(),
            "[dependencies]\nserde = \"=1.0.200\"\nrand = { version = \"~1.0.200\" }\n"
        );
    }

    #[test]
    fn test_ignored_dependency_removed() {
        let options = ManifestOptions::new("Cargo.toml").with_ignore(["tokio"]);
        let mut adapter = CargoTomlAdapter::new(options);
        let records = adapter.parse(MANIFEST).unwrap();
        assert!(records.iter().all(|r| r.name != "tokio"));

        let output = adapter.render(&records).unwrap();
        assert!(!output.contains("tokio"));
        assert!(output.contains("serde = { version = \"1.0\""));
    }

    #[test]
    fn test_missing_section_yields_no_records() {
        let content = "[package]\nname = \"empty\"\n";
        let mut adapter = adapter();
        let records = adapter.parse(content).unwrap();
        assert!(records.is_empty());
        assert_eq!(adapter.render(&records).unwrap(), content);
    }

    #[test]
    fn test_section_of_wrong_type() {
        let err = adapter().parse("dependencies = 3\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidSection { .. }));
    }

    #[test]
    fn test_non_string_version() {
        let err = adapter()
            .parse("[dependencies]\nserde = { version = 1 }\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidSection { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = adapter().parse("[dependencies\nserde = ").unwrap_err();
        assert!(matches!(err, ManifestError::TomlParseError { .. }));
    }

    #[test]
    fn test_render_unknown_record_is_inconsistent() {
        let mut adapter = adapter();
        adapter.parse(MANIFEST).unwrap();
        let stray = vec![ManifestRecord::new("local", "", "").with_latest("1.0")];
        assert!(matches!(
            adapter.render(&stray),
            Err(ManifestError::InconsistentRecord { .. })
        ));
    }
}
