//! Version ordering keys
//!
//! A version string is split into alternating runs of decimal digits and
//! non-digit text, e.g. `"1.2.3-rc1"` becomes `[1, ".", 2, ".", 3, "-rc", 1]`.
//! Keys compare lexicographically segment by segment:
//! - number vs number compares numerically, with no precision limit
//! - text vs text compares by code point
//! - number vs text: the number is always less, so `1.0` sorts before `1a`
//! - when one key is a prefix of the other, the shorter key is less

use std::cmp::Ordering;
use std::fmt;

/// One run of a version string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Decimal digits with leading zeros removed ("0" stays "0")
    Number(String),
    /// Any run of non-digit characters
    Text(String),
}

impl Segment {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Segment::Number("0".to_string())
        } else {
            Segment::Number(trimmed.to_string())
        }
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Leading zeros are gone, so a longer digit run is a larger number
            (Segment::Number(a), Segment::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Text(a), Segment::Text(b)) => a.chars().cmp(b.chars()),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Number(n) => write!(f, "{}", n),
            Segment::Text(t) => write!(f, "{:?}", t),
        }
    }
}

/// Comparable decomposition of a version string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionKey {
    segments: Vec<Segment>,
}

impl VersionKey {
    /// Split a version string into its digit and non-digit runs
    pub fn parse(version: &str) -> Self {
        let mut segments = Vec::new();
        let mut run = String::new();
        let mut run_is_digit = false;

        for c in version.chars() {
            let is_digit = c.is_ascii_digit();
            if !run.is_empty() && is_digit != run_is_digit {
                segments.push(Self::finish(&run, run_is_digit));
                run.clear();
            }
            run_is_digit = is_digit;
            run.push(c);
        }

        if !run.is_empty() {
            segments.push(Self::finish(&run, run_is_digit));
        }

        Self { segments }
    }

    fn finish(run: &str, is_digit: bool) -> Segment {
        if is_digit {
            Segment::number(run)
        } else {
            Segment::Text(run.to_string())
        }
    }

    /// The segments in order of occurrence
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the key has no segments (empty version string)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for VersionKey {
    fn from(version: &str) -> Self {
        Self::parse(version)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", segment)?;
        }
        write!(f, "]")
    }
}

/// Compare two version strings by their keys
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    VersionKey::parse(a).cmp(&VersionKey::parse(b))
}

/// Returns true when `current` is not behind `latest`
pub fn is_up_to_date(current: &str, latest: &str) -> bool {
    compare_versions(current, latest) != Ordering::Less
}

/// Pick the greatest version of a list by key ordering
pub fn latest_of<I, S>(versions: I) -> Option<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(a.as_ref(), b.as_ref()))
}
