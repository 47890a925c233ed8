//! Total order over parsed versions

use std::cmp::Ordering;

use crate::version::parser::ParsedVersion;

/// Compare two versions: major, minor, patch, then pre-release tag.
///
/// A tagged version sorts before the same numbers without a tag.
pub fn compare(a: &ParsedVersion, b: &ParsedVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then(a.prerelease.cmp(&b.prerelease))
}

/// Whether `latest` orders strictly after `current`
pub fn is_newer(current: &ParsedVersion, latest: &ParsedVersion) -> bool {
    compare(latest, current) == Ordering::Greater
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
