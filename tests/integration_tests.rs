//! Integration tests for depsync
//!
//! These tests verify:
//! - Full read → fetch → partition → write runs per dialect
//! - Format preservation of the written manifests
//! - Ignore list handling
//! - Destination resolution

use async_trait::async_trait;
use depsync::domain::Dialect;
use depsync::engine::{EngineConfig, EngineState, SyncEngine, SyncOutcome};
use depsync::error::{AppError, RegistryError};
use depsync::manifest::{create_adapter, ManifestOptions};
use depsync::output::{create_reporter, OutputFormat};
use depsync::registry::RegistryClient;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Registry answering from a fixed table and recording every lookup
#[derive(Clone, Default)]
struct StaticRegistry {
    versions: HashMap<String, String>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticRegistry {
    fn new(versions: &[(&str, &str)]) -> Self {
        Self {
            versions: versions
                .iter()
                .map(|(name, version)| (name.to_string(), version.to_string()))
                .collect(),
            lookups: Arc::default(),
        }
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    fn registry_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        self.lookups.lock().unwrap().push(package.to_string());
        self.versions
            .get(package)
            .cloned()
            .ok_or_else(|| RegistryError::package_not_found(package, "static"))
    }
}

fn write_manifest(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

async fn sync(
    dialect: Dialect,
    options: ManifestOptions,
    registry: StaticRegistry,
) -> Result<SyncOutcome, AppError> {
    let mut engine = SyncEngine::new(
        create_adapter(dialect, options),
        Box::new(registry),
        EngineConfig::default(),
    );
    let result = engine.run().await;
    match &result {
        Ok(_) => assert_eq!(engine.state(), EngineState::Done),
        Err(_) => assert_eq!(engine.state(), EngineState::Failed),
    }
    result
}

fn in_place(path: &Path) -> ManifestOptions {
    ManifestOptions::new(path).with_overwrite(true)
}

mod pip {
    use super::*;

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let dir = create_test_dir();
        let path = write_manifest(
            &dir,
            "requirements.txt",
            "flask==1.0.0\n# comment\nrequests==2.0.0\n",
        );
        let registry = StaticRegistry::new(&[("flask", "1.2.0"), ("requests", "2.0.0")]);

        let outcome = sync(Dialect::Pip, in_place(&path), registry).await.unwrap();

        let outdated: Vec<_> = outcome
            .partition
            .outdated
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(outdated, vec!["flask: 1.0.0 => 1.2.0"]);
        let up_to_date: Vec<_> = outcome
            .partition
            .up_to_date
            .iter()
            .map(|r| (r.name.as_str(), r.current_version.as_str()))
            .collect();
        assert_eq!(up_to_date, vec![("requests", "2.0.0")]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "flask==1.2.0\nrequests==2.0.0\n"
        );
    }

    #[tokio::test]
    async fn test_ignored_package_not_fetched_and_untouched() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "requirements.txt", "flask>=1.0\nsix==1.15.0\n");
        let registry = StaticRegistry::new(&[("flask", "3.0.0")]);
        let options = in_place(&path).with_ignore(["six"]);

        let outcome = sync(Dialect::Pip, options, registry.clone()).await.unwrap();

        assert_eq!(registry.lookups(), vec!["flask"]);
        assert!(outcome.records.iter().all(|r| r.name != "six"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "flask==3.0.0\nsix==1.15.0\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_line_writes_nothing() {
        let dir = create_test_dir();
        let content = "flask==1.0.0\nrequests\n";
        let path = write_manifest(&dir, "requirements.txt", content);
        let registry = StaticRegistry::new(&[("flask", "1.2.0")]);

        let err = sync(Dialect::Pip, in_place(&path), registry.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Manifest(ref e) if e.is_parse_error()));
        assert!(registry.lookups().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[tokio::test]
    async fn test_default_destination_is_temp_dir() {
        let dir = create_test_dir();
        let unique = dir
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();
        let name = format!("requirements-{}.txt", unique);
        let content = "flask==1.0.0\n";
        let path = write_manifest(&dir, &name, content);
        let registry = StaticRegistry::new(&[("flask", "1.2.0")]);

        let outcome = sync(Dialect::Pip, ManifestOptions::new(&path), registry)
            .await
            .unwrap();

        let expected = std::env::temp_dir().join(&name);
        assert_eq!(outcome.destination, expected);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "flask==1.2.0\n");
        fs::remove_file(expected).unwrap();
    }
}

mod gem {
    use super::*;

    #[tokio::test]
    async fn test_versions_replaced_and_appended() {
        let dir = create_test_dir();
        let content = concat!(
            "source 'https://rubygems.org'\n",
            "\n",
            "gem 'foo', '1.0.0'\n",
            "gem 'bar'\n",
            "gem 'rails', '~> 6.0'\n",
        );
        let path = write_manifest(&dir, "Gemfile", content);
        let registry =
            StaticRegistry::new(&[("foo", "2.0.0"), ("bar", "3.1.0"), ("rails", "7.1.3")]);

        let outcome = sync(Dialect::Gem, in_place(&path), registry).await.unwrap();

        assert_eq!(outcome.partition.outdated.len(), 3);
        assert_eq!(outcome.partition.outdated[1].current_version, "");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            concat!(
                "source 'https://rubygems.org'\n",
                "\n",
                "gem 'foo', '2.0.0'\n",
                "gem 'bar', '3.1.0'\n",
                "gem 'rails', '~> 7.1.3'\n",
            )
        );
    }

    #[tokio::test]
    async fn test_ignored_gem_left_at_current_version() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Gemfile", "gem 'foo', '1.0.0'\ngem 'bar', '0.1'\n");
        let registry = StaticRegistry::new(&[("foo", "2.0.0")]);

        sync(Dialect::Gem, in_place(&path).with_ignore(["bar"]), registry.clone())
            .await
            .unwrap();

        assert_eq!(registry.lookups(), vec!["foo"]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "gem 'foo', '2.0.0'\ngem 'bar', '0.1'\n"
        );
    }
}

mod crate_toml {
    use super::*;

    const CARGO_TOML: &str = r#"[package]
name = "demo"
version = "0.1.0"
edition = "2021"

# Runtime dependencies
[dependencies]
serde = { version = "1.0.200", features = ["derive"] }  # keep derive
tokio = "^1.40"
helper = { path = "../helper" }

[dev-dependencies]
tempfile = "3"
"#;

    #[tokio::test]
    async fn test_round_trip_without_changes_is_exact() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Cargo.toml", CARGO_TOML);
        let registry = StaticRegistry::new(&[("serde", "1.0.200"), ("tokio", "1.40")]);

        let outcome = sync(Dialect::Crate, in_place(&path), registry.clone())
            .await
            .unwrap();

        assert!(outcome.partition.outdated.is_empty());
        assert_eq!(registry.lookups(), vec!["serde", "tokio"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), CARGO_TOML);
    }

    #[tokio::test]
    async fn test_only_version_fields_change() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Cargo.toml", CARGO_TOML);
        let registry = StaticRegistry::new(&[("serde", "1.0.219"), ("tokio", "1.49.0")]);

        sync(Dialect::Crate, in_place(&path), registry).await.unwrap();

        let expected = CARGO_TOML
            .replace("\"1.0.200\"", "\"1.0.219\"")
            .replace("\"^1.40\"", "\"^1.49.0\"");
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_ignored_crate_removed() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Cargo.toml", CARGO_TOML);
        let registry = StaticRegistry::new(&[("serde", "1.0.200")]);

        sync(Dialect::Crate, in_place(&path).with_ignore(["tokio"]), registry)
            .await
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("tokio"));
        assert!(written.contains("helper = { path = \"../helper\" }"));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_parse_error() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Cargo.toml", "[dependencies\n");

        let err = sync(Dialect::Crate, in_place(&path), StaticRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Manifest(ref e) if e.is_parse_error()));
    }
}

mod npm {
    use super::*;

    const PACKAGE_JSON: &str = r#"{
  "name": "web",
  "private": true,
  "files": ["dist", "lib"],
  "engines": { "node": ">=18" },
  "dependencies": {
    "react": "^18.2.0",
    "lodash": "4.17.20"
  },
  "devDependencies": {
    "vite": "^5.0.0"
  }
}
"#;

    #[tokio::test]
    async fn test_round_trip_without_changes_is_exact() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "package.json", PACKAGE_JSON);
        let registry = StaticRegistry::new(&[("react", "18.2.0"), ("lodash", "4.17.20")]);

        sync(Dialect::Npm, in_place(&path), registry).await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), PACKAGE_JSON);
    }

    #[tokio::test]
    async fn test_ignored_package_removed_from_dependencies() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "package.json", PACKAGE_JSON);
        let registry = StaticRegistry::new(&[("react", "19.0.0")]);

        let outcome = sync(Dialect::Npm, in_place(&path).with_ignore(["lodash"]), registry)
            .await
            .unwrap();

        assert!(outcome.partition.iter().all(|r| r.name != "lodash"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("lodash"));
        assert!(written.contains("\"react\": \"^19.0.0\""));
        assert!(written.contains("\"vite\": \"^5.0.0\""));
    }
}

mod composer {
    use super::*;

    #[tokio::test]
    async fn test_require_updated_platform_untouched() {
        let dir = create_test_dir();
        let content = r#"{
    "require": {
        "php": "^8.1",
        "monolog/monolog": "^2.0"
    }
}
"#;
        let path = write_manifest(&dir, "composer.json", content);
        let registry = StaticRegistry::new(&[("monolog/monolog", "3.5.0")]);

        let outcome = sync(Dialect::Composer, in_place(&path), registry.clone())
            .await
            .unwrap();

        assert_eq!(registry.lookups(), vec!["monolog/monolog"]);
        assert_eq!(outcome.partition.outdated.len(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            content.replace("\"^2.0\"", "\"^3.5.0\"")
        );
    }
}

mod reporting {
    use super::*;

    #[tokio::test]
    async fn test_text_report_of_a_run() {
        let dir = create_test_dir();
        let path = write_manifest(
            &dir,
            "requirements.txt",
            "flask==1.0.0\nrequests==2.0.0\n",
        );
        let registry = StaticRegistry::new(&[("flask", "1.2.0"), ("requests", "2.0.0")]);
        let outcome = sync(Dialect::Pip, in_place(&path), registry).await.unwrap();

        let mut output = Vec::new();
        create_reporter(OutputFormat::Text, false)
            .report(&outcome, &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("\nAvailable:\n  flask     1.0.0 =>  1.2.0\n"));
        assert!(text.contains("\nLatest [OK]:\n  requests  2.0.0\n"));
        assert!(text.ends_with(&format!(
            "Wrote latest package versions to: {}\n",
            path.display()
        )));
    }

    #[tokio::test]
    async fn test_json_report_of_a_run() {
        let dir = create_test_dir();
        let path = write_manifest(&dir, "Gemfile", "gem 'rake', '13.0.0'\n");
        let registry = StaticRegistry::new(&[("rake", "13.2.1")]);
        let outcome = sync(Dialect::Gem, in_place(&path), registry).await.unwrap();

        let mut output = Vec::new();
        create_reporter(OutputFormat::Json, false)
            .report(&outcome, &mut output)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(json["outdated"][0]["name"], "rake");
        assert_eq!(json["outdated"][0]["latest"], "13.2.1");
        assert!(json["up_to_date"].as_array().unwrap().is_empty());
    }
}
