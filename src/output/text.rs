//! Text output for human-readable display
//!
//! ```text
//! Available:
//!   flask    1.0.0 =>  1.2.0
//!
//! Latest [OK]:
//!   requests 2.0.0
//! ```
//!
//! Both blocks share one column layout, computed over every record.

use crate::domain::ManifestRecord;
use crate::engine::SyncOutcome;
use crate::output::Reporter;
use colored::Colorize;
use std::io::Write;

/// Shown in place of an empty current version
const NO_VERSION: &str = "none";

/// Text reporter with aligned columns
pub struct TextReporter {
    color: bool,
}

impl TextReporter {
    /// Create a new text reporter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, title: &str, highlight: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            highlight(title).to_string()
        } else {
            title.to_string()
        }
    }
}

fn current_display(record: &ManifestRecord) -> &str {
    if record.current_version.is_empty() {
        NO_VERSION
    } else {
        &record.current_version
    }
}

fn latest_display(record: &ManifestRecord) -> &str {
    record.latest_version.as_deref().unwrap_or(NO_VERSION)
}

/// Column widths: longest name plus one, longest current version
fn column_widths(records: &[ManifestRecord]) -> (usize, usize) {
    let name = records.iter().map(|r| r.name.len()).max().unwrap_or(0) + 1;
    let current = records
        .iter()
        .map(|r| current_display(r).len())
        .max()
        .unwrap_or(0);
    (name, current)
}

impl Reporter for TextReporter {
    fn announce(&self, package_count: usize, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "Fetching version information for {} packages...",
            package_count
        )
    }

    fn report(&self, outcome: &SyncOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
        let (name_width, current_width) = column_widths(&outcome.records);
        let partition = &outcome.partition;

        if !partition.outdated.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.header("Available:", |s| s.yellow().bold()))?;
            for record in &partition.outdated {
                writeln!(
                    writer,
                    "  {:<nw$} {:<cw$} =>  {}",
                    record.name,
                    current_display(record),
                    latest_display(record),
                    nw = name_width,
                    cw = current_width,
                )?;
            }
        }

        if !partition.up_to_date.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.header("Latest [OK]:", |s| s.green().bold()))?;
            for record in &partition.up_to_date {
                writeln!(
                    writer,
                    "  {:<nw$} {}",
                    record.name,
                    latest_display(record),
                    nw = name_width,
                )?;
            }
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Wrote latest package versions to: {}",
            outcome.destination.display()
        )
    }
}
