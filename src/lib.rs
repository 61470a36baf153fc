//! depsync - dependency manifest synchroniser
//!
//! Reads a manifest, looks up the latest published version of every
//! dependency, reports which are outdated and writes the manifest back with
//! the latest versions while keeping the rest of the file as it was:
//! - pip (requirements.txt)
//! - gem (Gemfile)
//! - crate (Cargo.toml)
//! - npm (package.json)
//! - composer (composer.json)

pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod registry;
