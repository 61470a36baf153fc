//! JSON output for machine processing

use crate::domain::ManifestRecord;
use crate::engine::SyncOutcome;
use crate::output::Reporter;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON reporter
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a run
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Where the rewritten manifest went
    destination: &'a Path,
    outdated: Vec<JsonPackage<'a>>,
    up_to_date: Vec<JsonPackage<'a>>,
}

#[derive(Serialize)]
struct JsonPackage<'a> {
    name: &'a str,
    current: &'a str,
    latest: Option<&'a str>,
}

impl<'a> From<&'a ManifestRecord> for JsonPackage<'a> {
    fn from(record: &'a ManifestRecord) -> Self {
        Self {
            name: &record.name,
            current: &record.current_version,
            latest: record.latest_version.as_deref(),
        }
    }
}

impl Reporter for JsonReporter {
    fn announce(&self, _package_count: usize, _writer: &mut dyn Write) -> std::io::Result<()> {
        // Output stays a single JSON document
        Ok(())
    }

    fn report(&self, outcome: &SyncOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            destination: &outcome.destination,
            outdated: outcome.partition.outdated.iter().map(Into::into).collect(),
            up_to_date: outcome.partition.up_to_date.iter().map(Into::into).collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Partition;
    use serde_json::Value;
    use std::path::PathBuf;

    #[test]
    fn test_report_structure() {
        let records = vec![
            ManifestRecord::new("flask", "==1.0.0", "1.0.0").with_latest("1.2.0"),
            ManifestRecord::new("requests", "==2.0.0", "2.0.0").with_latest("2.0.0"),
        ];
        let outcome = SyncOutcome {
            partition: Partition::split(&records),
            destination: PathBuf::from("/tmp/requirements.txt"),
            records,
        };

        let mut output = Vec::new();
        JsonReporter::new().report(&outcome, &mut output).unwrap();
        let json: Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(json["destination"], "/tmp/requirements.txt");
        assert_eq!(json["outdated"][0]["name"], "flask");
        assert_eq!(json["outdated"][0]["current"], "1.0.0");
        assert_eq!(json["outdated"][0]["latest"], "1.2.0");
        assert_eq!(json["up_to_date"][0]["name"], "requests");
        assert_eq!(json["up_to_date"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_announce_writes_nothing() {
        let mut output = Vec::new();
        JsonReporter::new().announce(3, &mut output).unwrap();
        assert!(output.is_empty());
    }
}
