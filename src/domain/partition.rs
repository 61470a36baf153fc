//! Split of looked-up records into outdated and up-to-date sets

use serde::Serialize;

use super::ManifestRecord;

/// Records grouped by comparison against their latest version
///
/// Order inside each group is the order the records were read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Current version strictly behind latest
    pub outdated: Vec<ManifestRecord>,
    /// Current version equal to or ahead of latest
    pub up_to_date: Vec<ManifestRecord>,
}

impl Partition {
    /// Splits records with a stable, order-preserving pass
    pub fn split(records: &[ManifestRecord]) -> Self {
        let (outdated, up_to_date) = records
            .iter()
            .cloned()
            .partition(|record| record.is_outdated());
        Self {
            outdated,
            up_to_date,
        }
    }

    /// Total number of records across both groups
    pub fn len(&self) -> usize {
        self.outdated.len() + self.up_to_date.len()
    }

    /// Returns true if there are no records at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every record, outdated first
    pub fn iter(&self) -> impl Iterator<Item = &ManifestRecord> {
        self.outdated.iter().chain(self.up_to_date.iter())
    }
}
