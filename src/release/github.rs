//! GitHub Releases API fetcher implementation

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::error::FetchError;
use crate::release::fetcher::ReleaseFetcher;
use crate::release::types::ReleaseRecord;
use crate::repository::RepositoryRef;

/// Fetcher implementation for the GitHub "latest release" endpoint
pub struct GitHubReleaseFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl GitHubReleaseFetcher {
    /// Creates a new GitHubReleaseFetcher with a custom base URL and timeout
    ///
    /// Requests are HTTPS only unless `base_url` points at a loopback host,
    /// which is how tests reach a local mock server.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(timeout_secs))
                .https_only(!is_loopback(base_url))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Network(e)
        }
    }
}

fn is_loopback(base_url: &str) -> bool {
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .is_some_and(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]"))
}

impl Default for GitHubReleaseFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait::async_trait]
impl ReleaseFetcher for GitHubReleaseFetcher {
    async fn fetch_latest_release(
        &self,
        repository: &RepositoryRef,
    ) -> Result<ReleaseRecord, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, repository.owner, repository.repo
        );
        debug!("Fetching latest release: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NoReleasesFound(repository.to_string()));
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse GitHub release response: {}", e);
            FetchError::MalformedResponse(e.to_string())
        })
    }
}
