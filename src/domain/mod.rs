//! Core domain models for depsync
//!
//! This module contains the fundamental types used throughout the application:
//! - Manifest dialects
//! - Version ordering keys
//! - The uniform dependency record
//! - Outdated / up-to-date partitioning

mod dialect;
mod partition;
mod record;
pub mod version_key;

pub use dialect::Dialect;
pub use partition::Partition;
pub use record::{strip_range_prefix, ManifestRecord, RANGE_OPERATORS};
pub use version_key::{compare_versions, is_up_to_date, latest_of, Segment, VersionKey};
