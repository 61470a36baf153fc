//! Reporting of a finished run
//!
//! This module provides:
//! - Text output with aligned columns for human-readable display
//! - JSON output for machine processing
//!
//! Reporters only read the outcome; they never touch the records.

mod json;
mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::engine::SyncOutcome;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

impl OutputFormat {
    /// Name used on the command line (`output=<name>`)
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err("expected 'text' or 'json'".to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for run reporters
pub trait Reporter {
    /// Written once the manifest has been read, before any lookup
    fn announce(&self, package_count: usize, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write the outcome of a run
    fn report(&self, outcome: &SyncOutcome, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create a reporter for the chosen format
pub fn create_reporter(format: OutputFormat, color: bool) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(color)),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    }
}
