//! Repository identifier resolution
//!
//! Accepted shapes, tried in order:
//! - `owner/repo`
//! - `github.com/owner/repo` (with or without `http(s)://`)
//! - `git@github.com:owner/repo.git`
//!
//! A trailing `.git` and trailing slashes are ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RepositoryError;

const NAME: &str = r"[A-Za-z0-9_.-]+";

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"^(?P<owner>{NAME})/(?P<repo>{NAME})$"),
        format!(r"^(?i:https?://)?(?i:www\.)?(?i:github\.com)/(?P<owner>{NAME})/(?P<repo>{NAME})$"),
        format!(r"^(?i:git@github\.com):(?P<owner>{NAME})/(?P<repo>{NAME})$"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// A GitHub repository reduced to its `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepositoryRef {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

/// Normalize a repository identifier into an `owner/repo` pair
pub fn resolve(raw: &str) -> Result<RepositoryRef, RepositoryError> {
    let normalized = normalize(raw);

    PATTERNS
        .iter()
        .find_map(|re| re.captures(normalized))
        .and_then(|caps| {
            let owner = caps.name("owner")?.as_str();
            let repo = caps.name("repo")?.as_str();
            // "." and ".." pass the character class but are not names
            if is_dot_segment(owner) || is_dot_segment(repo) || is_github_host(owner) {
                return None;
            }
            Some(RepositoryRef::new(owner, repo))
        })
        .ok_or_else(|| RepositoryError::InvalidFormat(raw.to_string()))
}

fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim().trim_end_matches('/');
    trimmed
        .strip_suffix(".git")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
}

fn is_dot_segment(s: &str) -> bool {
    s.chars().all(|c| c == '.')
}

// "github.com/repo" would otherwise read as owner "github.com"
fn is_github_host(owner: &str) -> bool {
    owner.eq_ignore_ascii_case("github.com") || owner.eq_ignore_ascii_case("www.github.com")
}
