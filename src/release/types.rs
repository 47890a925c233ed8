//! Release data returned by the fetcher

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The most recent published release of a repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct ReleaseRecord {
    /// Tag of the release (e.g. "v0.2.19")
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    /// Release notes; GitHub sends `null` when empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_at: String,
}

impl ReleaseRecord {
    /// Publish timestamp, if GitHub sent a valid RFC 3339 value
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
