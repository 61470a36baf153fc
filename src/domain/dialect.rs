//! Manifest dialects and their package registries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Supported manifest syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// pip requirements file
    Pip,
    /// Ruby Gemfile
    Gem,
    /// Cargo.toml
    Crate,
    /// package.json
    Npm,
    /// composer.json
    Composer,
}

impl Dialect {
    /// Returns the name used on the command line (`type=<name>`)
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Pip => "pip",
            Dialect::Gem => "gem",
            Dialect::Crate => "crate",
            Dialect::Npm => "npm",
            Dialect::Composer => "composer",
        }
    }

    /// Returns the display name of the registry queried for this dialect
    pub fn registry_name(&self) -> &'static str {
        match self {
            Dialect::Pip => "PyPI",
            Dialect::Gem => "RubyGems",
            Dialect::Crate => "crates.io",
            Dialect::Npm => "npms.io",
            Dialect::Composer => "Packagist",
        }
    }

    /// Returns all supported dialects
    pub fn all() -> &'static [Dialect] {
        &[
            Dialect::Pip,
            Dialect::Gem,
            Dialect::Crate,
            Dialect::Npm,
            Dialect::Composer,
        ]
    }

    /// Comma separated list of the accepted `type=` values
    pub fn supported_names() -> String {
        Self::all()
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| ConfigError::UnsupportedDialect {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
