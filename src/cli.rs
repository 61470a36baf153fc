//! CLI argument parsing module for depsync
//!
//! The command line is a list of `key=value` settings:
//!
//! ```text
//! depsync file=requirements.txt type=pip ignore=flask,six overwrite=true
//! ```
//!
//! clap collects the raw tokens and provides `--help` and `--version`;
//! [`RunConfig::from_args`] validates them before any file is touched.

use crate::domain::Dialect;
use crate::engine::{EngineConfig, DEFAULT_CONCURRENCY};
use crate::error::ConfigError;
use crate::manifest::ManifestOptions;
use crate::output::OutputFormat;
use crate::registry::DEFAULT_TIMEOUT;
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Keep manifest dependencies at their latest published versions
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depsync",
    version,
    about = "Check manifest dependencies against their registry and write the latest versions",
    after_help = "Settings:\n  \
        file=<path>                          manifest to read (required)\n  \
        type=<pip|gem|crate|npm|composer>    manifest dialect (required)\n  \
        ignore=<a,b,c>                       packages to leave alone\n  \
        overwrite=<true|false>               rewrite the manifest in place (default: false)\n  \
        output=<text|json>                   report format (default: text)\n  \
        concurrency=<N>                      registry lookups in flight (default: 1)\n  \
        timeout=<seconds>                    per-request timeout (default: 30)\n  \
        verbose=<true|false>                 debug logging on stderr (default: false)\n  \
        progress=<true|false>                progress bar while fetching (default: true)"
)]
pub struct CliArgs {
    /// Settings as key=value pairs
    #[arg(value_name = "KEY=VALUE")]
    pub settings: Vec<String>,
}

/// Validated configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub file: PathBuf,
    pub dialect: Dialect,
    pub ignore: BTreeSet<String>,
    pub overwrite: bool,
    pub output: OutputFormat,
    pub concurrency: usize,
    pub timeout: Duration,
    pub verbose: bool,
    pub progress: bool,
}

impl RunConfig {
    /// Validate parsed CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::from_settings(args.settings.iter().map(String::as_str))
    }

    /// Validate raw `key=value` tokens; later duplicates win
    pub fn from_settings<'a, I>(settings: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut file = None;
        let mut dialect = None;
        let mut ignore = BTreeSet::new();
        let mut overwrite = false;
        let mut output = OutputFormat::default();
        let mut concurrency = DEFAULT_CONCURRENCY;
        let mut timeout = DEFAULT_TIMEOUT;
        let mut verbose = false;
        let mut progress = true;

        for token in settings {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                ConfigError::invalid_argument(token, "", "expected key=value")
            })?;

            match key {
                "file" => {
                    if value.is_empty() {
                        return Err(ConfigError::invalid_argument(key, value, "path is empty"));
                    }
                    file = Some(PathBuf::from(value));
                }
                "type" => dialect = Some(value.parse::<Dialect>()?),
                "ignore" => ignore = parse_list(value),
                "overwrite" => overwrite = parse_bool(key, value)?,
                "output" => {
                    output = value
                        .parse()
                        .map_err(|message: String| ConfigError::invalid_argument(key, value, message))?
                }
                "concurrency" => concurrency = parse_positive(key, value)?,
                "timeout" => {
                    timeout = Duration::from_secs(parse_positive::<u64>(key, value)?);
                }
                "verbose" => verbose = parse_bool(key, value)?,
                "progress" => progress = parse_bool(key, value)?,
                _ => {
                    return Err(ConfigError::UnknownArgument {
                        key: key.to_string(),
                    })
                }
            }
        }

        let file = file.ok_or_else(|| ConfigError::MissingArgument {
            key: "file".to_string(),
        })?;
        let dialect = dialect.ok_or_else(|| ConfigError::MissingArgument {
            key: "type".to_string(),
        })?;

        Ok(Self {
            file,
            dialect,
            ignore,
            overwrite,
            output,
            concurrency,
            timeout,
            verbose,
            progress,
        })
    }

    /// Options for the manifest adapter
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions::new(&self.file)
            .with_ignore(self.ignore.iter().cloned())
            .with_overwrite(self.overwrite)
    }

    /// Options for the sync engine
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            concurrency: self.concurrency,
            request_timeout: self.timeout,
        }
    }
}

/// Comma separated names; blanks dropped
fn parse_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_argument(
            key,
            value,
            "expected true or false",
        )),
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::invalid_argument(
            key,
            value,
            "expected a positive integer",
        )),
    }
}
