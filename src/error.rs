//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: manifest decoding, consistency and write failures
//! - RegistryError: package registry lookups
//! - ConfigError: CLI configuration, detected before any file I/O

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Dialect;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the rewritten manifest
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (package.json, composer.json)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (Cargo.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// A requirements or Gemfile line without the expected shape
    #[error("failed to parse line {line_number} of {path} ('{line}'): {message}")]
    LineParseError {
        path: PathBuf,
        line_number: usize,
        line: String,
        message: String,
    },

    /// A dependency section or entry with the wrong structure
    #[error("invalid '{section}' section in {path}: {message}")]
    InvalidSection {
        path: PathBuf,
        section: String,
        message: String,
    },

    /// A record handed to write-back that the manifest never produced
    #[error("internal error: package '{package}' is not present in the loaded manifest {path}")]
    InconsistentRecord { path: PathBuf, package: String },

    /// Write-back requested before the manifest was read
    #[error("internal error: manifest {path} was written back before it was read")]
    NotLoaded { path: PathBuf },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unsupported manifest dialect
    #[error("unsupported type '{value}': expected one of {}", Dialect::supported_names())]
    UnsupportedDialect { value: String },

    /// Required argument not given
    #[error("missing required argument '{key}=<value>'")]
    MissingArgument { key: String },

    /// Argument with an unusable value
    #[error("invalid value '{value}' for '{key}': {message}")]
    InvalidArgument {
        key: String,
        value: String,
        message: String,
    },

    /// Argument key that is not recognised
    #[error("unknown argument '{key}'")]
    UnknownArgument { key: String },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new LineParseError; `line_number` is 1-based
    pub fn line_parse_error(
        path: impl Into<PathBuf>,
        line_number: usize,
        line: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::LineParseError {
            path: path.into(),
            line_number,
            line: line.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidSection error
    pub fn invalid_section(
        path: impl Into<PathBuf>,
        section: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidSection {
            path: path.into(),
            section: section.into(),
            message: message.into(),
        }
    }

    /// Creates a new InconsistentRecord error
    pub fn inconsistent_record(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        ManifestError::InconsistentRecord {
            path: path.into(),
            package: package.into(),
        }
    }

    /// Returns true for the decoding failures grouped as parse errors
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ManifestError::JsonParseError { .. }
                | ManifestError::TomlParseError { .. }
                | ManifestError::LineParseError { .. }
                | ManifestError::InvalidSection { .. }
        )
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidArgument error
    pub fn invalid_argument(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidArgument {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}
