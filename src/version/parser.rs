//! Permissive version string parser
//!
//! Never fails. Anything it cannot read degrades to zeros and a final
//! release:
//! - `"v1.2"` -> 1.2.0
//! - `"1.0.0rc"` -> 1.0.0, release candidate
//! - `"1.0-rc.1"` -> 1.0.0, release candidate (nothing after the tag is read)
//! - `"0.2.18d"` -> 0.2.18, final (unknown suffix)
//! - `"nonsense"` -> 0.0.0, final

use std::fmt;

/// Pre-release marker, ordered `Alpha < Beta < ReleaseCandidate < Final`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PrereleaseTag {
    Alpha,
    Beta,
    ReleaseCandidate,
    /// No tag, or a tag that is not recognized
    #[default]
    Final,
}

impl PrereleaseTag {
    /// Classify a suffix such as `"a"`, `"beta"`, `"-rc1"` or `"RC"`
    pub fn from_suffix(suffix: &str) -> Self {
        let suffix = suffix.trim_start_matches('-').to_ascii_lowercase();

        if suffix.starts_with("rc") {
            PrereleaseTag::ReleaseCandidate
        } else if suffix.starts_with('a') {
            PrereleaseTag::Alpha
        } else if suffix.starts_with('b') {
            PrereleaseTag::Beta
        } else {
            PrereleaseTag::Final
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrereleaseTag::Alpha => "alpha",
            PrereleaseTag::Beta => "beta",
            PrereleaseTag::ReleaseCandidate => "rc",
            PrereleaseTag::Final => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: PrereleaseTag,
}

impl ParsedVersion {
    pub fn new(major: u64, minor: u64, patch: u64, prerelease: PrereleaseTag) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease,
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease != PrereleaseTag::Final
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_prerelease() {
            write!(f, "-{}", self.prerelease.as_str())?;
        }
        Ok(())
    }
}

/// Parse a version string into its numeric components and pre-release tag
pub fn parse(version: &str) -> ParsedVersion {
    let trimmed = version.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let segments: Vec<&str> = stripped.split('.').take(3).collect();
    let mut numbers = [0u64; 3];
    let mut prerelease = PrereleaseTag::Final;

    // The first segment with a non-digit tail ends the numeric prefix
    for (i, segment) in segments.iter().enumerate() {
        let (digits, rest) = split_numeric_prefix(segment);
        numbers[i] = parse_number(digits);

        if !rest.is_empty() {
            prerelease = PrereleaseTag::from_suffix(rest);
            break;
        }
    }

    ParsedVersion::new(numbers[0], numbers[1], numbers[2], prerelease)
}

fn split_numeric_prefix(segment: &str) -> (&str, &str) {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment.split_at(end)
}

// Out-of-range numbers saturate rather than fall back to zero
fn parse_number(digits: &str) -> u64 {
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}
