//! Fetcher trait for retrieving the latest release of a repository

#[cfg(test)]
use mockall::automock;

use crate::error::FetchError;
use crate::release::types::ReleaseRecord;
use crate::repository::RepositoryRef;

/// Trait for fetching the latest release from a release host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseFetcher: Send + Sync {
    /// Fetches the latest published release of a repository
    ///
    /// Makes a single attempt; there are no retries.
    ///
    /// # Returns
    /// * `Ok(ReleaseRecord)` - The latest release
    /// * `Err(FetchError::NoReleasesFound)` - The repository has no releases
    /// * `Err(FetchError)` - Any other failure
    async fn fetch_latest_release(
        &self,
        repository: &RepositoryRef,
    ) -> Result<ReleaseRecord, FetchError>;
}
