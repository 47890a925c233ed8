//! Update check orchestration
//!
//! One check walks `Resolving -> Fetching -> Parsing -> Comparing -> Completed`.
//! Each stage runs once; a failure at any stage jumps straight to `Completed`
//! with an error-carrying [`VersionCheckResult`].

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::CheckConfig;
use crate::error::{CheckError, ErrorKind, FetchError};
use crate::release::fetcher::ReleaseFetcher;
use crate::release::github::GitHubReleaseFetcher;
use crate::release::types::ReleaseRecord;
use crate::repository;
use crate::version::{is_newer, parse};

/// Stage of a single check, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    Resolving,
    Fetching,
    Parsing,
    Comparing,
    Completed,
}

impl CheckStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStage::Resolving => "resolving",
            CheckStage::Fetching => "fetching",
            CheckStage::Parsing => "parsing",
            CheckStage::Comparing => "comparing",
            CheckStage::Completed => "completed",
        }
    }
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check
///
/// Built once and never modified. `error_message` is set only when the check
/// could not complete, and then `has_update` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheckResult {
    has_update: bool,
    current_version: String,
    latest_version: String,
    download_url: String,
    release_notes: String,
    published_date: String,
    error_message: Option<String>,
    error_kind: Option<ErrorKind>,
    is_newer: bool,
}

impl VersionCheckResult {
    fn from_release(current_version: &str, release: ReleaseRecord, has_update: bool) -> Self {
        Self {
            has_update,
            current_version: current_version.to_string(),
            latest_version: release.tag_name,
            download_url: release.html_url,
            release_notes: release.body,
            published_date: release.published_at,
            error_message: None,
            error_kind: None,
            is_newer: has_update,
        }
    }

    fn from_failure(current_version: &str, kind: ErrorKind, message: String) -> Self {
        Self {
            has_update: false,
            current_version: current_version.to_string(),
            latest_version: String::new(),
            download_url: String::new(),
            release_notes: String::new(),
            published_date: String::new(),
            error_message: Some(message),
            error_kind: Some(kind),
            is_newer: false,
        }
    }

    fn from_error(current_version: &str, error: &CheckError) -> Self {
        Self::from_failure(current_version, error.kind(), error.to_string())
    }

    /// True iff the latest release orders strictly after the current version
    pub fn has_update(&self) -> bool {
        self.has_update
    }

    /// Same as [`has_update`](Self::has_update)
    pub fn is_newer(&self) -> bool {
        self.is_newer
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Tag of the latest release, as fetched
    pub fn latest_version(&self) -> &str {
        &self.latest_version
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub fn release_notes(&self) -> &str {
        &self.release_notes
    }

    pub fn published_date(&self) -> &str {
        &self.published_date
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Runs update checks for one repository and current version
///
/// Cloning is cheap; clones share the fetcher and configuration.
#[derive(Clone)]
pub struct UpdateChecker {
    config: Arc<CheckConfig>,
    fetcher: Arc<dyn ReleaseFetcher>,
}

impl UpdateChecker {
    /// Create a checker that talks to the GitHub API
    pub fn new(config: CheckConfig) -> Self {
        let fetcher =
            GitHubReleaseFetcher::new(&config.api_base_url, config.effective_timeout_secs());
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a checker with the given fetcher
    pub fn with_fetcher(config: CheckConfig, fetcher: Arc<dyn ReleaseFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run one check on the current async runtime
    pub async fn check(&self) -> VersionCheckResult {
        let current_version = &self.config.current_version;

        let result = match self.run().await {
            Ok(result) => result,
            Err(e) => {
                warn!("Update check for {} failed: {}", self.config.repository, e);
                VersionCheckResult::from_error(current_version, &e)
            }
        };

        debug!(stage = %CheckStage::Completed, repository = %self.config.repository);
        result
    }

    async fn run(&self) -> Result<VersionCheckResult, CheckError> {
        let config = &self.config;

        debug!(stage = %CheckStage::Resolving, repository = %config.repository);
        let repository = repository::resolve(&config.repository)?;

        debug!(stage = %CheckStage::Fetching, repository = %repository);
        let timeout_secs = config.effective_timeout_secs();
        let release = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.fetcher.fetch_latest_release(&repository),
        )
        .await
        .map_err(|_| FetchError::Timeout(timeout_secs))??;

        debug!(stage = %CheckStage::Parsing, latest = %release.tag_name);
        let current = parse(&config.current_version);
        let latest = parse(&release.tag_name);

        debug!(stage = %CheckStage::Comparing, %current, %latest);
        let has_update = is_newer(&current, &latest);

        info!(
            "Checked {}: current {}, latest {}, update available: {}",
            repository, config.current_version, release.tag_name, has_update
        );

        Ok(VersionCheckResult::from_release(
            &config.current_version,
            release,
            has_update,
        ))
    }

    /// Run one check, blocking the calling thread until it completes
    ///
    /// Safe to call from inside an async runtime; the check then runs on a
    /// separate thread with its own runtime.
    pub fn get_latest_version(&self) -> VersionCheckResult {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.run_blocking();
        }

        std::thread::scope(|scope| {
            scope
                .spawn(|| self.run_blocking())
                .join()
                .unwrap_or_else(|_| self.internal_failure("update check thread panicked"))
        })
    }

    /// Run one check on a background thread and hand the result to `callback`
    ///
    /// Returns immediately. `callback` runs exactly once, on the background
    /// thread.
    pub fn check_for_updates<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(VersionCheckResult) + Send + 'static,
    {
        let checker = self.clone();
        std::thread::spawn(move || {
            let result = checker.run_blocking();
            callback(result);
        })
    }

    fn run_blocking(&self) -> VersionCheckResult {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Failed to start async runtime: {}", e);
                return self.internal_failure(&format!("Failed to start async runtime: {e}"));
            }
        };

        catch_unwind(AssertUnwindSafe(|| runtime.block_on(self.check()))).unwrap_or_else(|_| {
            error!("Update check for {} panicked", self.config.repository);
            self.internal_failure("update check panicked")
        })
    }

    fn internal_failure(&self, message: &str) -> VersionCheckResult {
        VersionCheckResult::from_failure(
            &self.config.current_version,
            ErrorKind::Internal,
            message.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::release::fetcher::MockReleaseFetcher;
    use crate::repository::RepositoryRef;
    use mockall::predicate::eq;
    use rstest::rstest;
    use std::sync::mpsc;

    fn release(tag: &str) -> ReleaseRecord {
        ReleaseRecord {
            tag_name: tag.to_string(),
            html_url: format!("https://github.com/owner/app/releases/tag/{tag}"),
            body: "notes".to_string(),
            published_at: "2024-01-15T00:00:00Z".to_string(),
        }
    }

    fn checker_returning(current: &str, tag: &str) -> UpdateChecker {
        let tag = tag.to_string();
        let mut fetcher = MockReleaseFetcher::new();
        fetcher
            .expect_fetch_latest_release()
            .with(eq(RepositoryRef::new("owner", "app")))
            .times(1)
            .returning(move |_| Ok(release(&tag)));

        UpdateChecker::with_fetcher(CheckConfig::new("owner/app", current), Arc::new(fetcher))
    }

    fn checker_failing(current: &str, error: fn() -> FetchError) -> UpdateChecker {
        let mut fetcher = MockReleaseFetcher::new();
        fetcher
            .expect_fetch_latest_release()
            .times(1)
            .returning(move |_| Err(error()));

        UpdateChecker::with_fetcher(CheckConfig::new("owner/app", current), Arc::new(fetcher))
    }

    #[rstest]
    #[case("0.2.18", "0.2.19", true)]
    #[case("0.2.19", "v0.2.19", false)]
    #[case("0.3.0", "0.2.19", false)]
    #[case("1.0.0", "1.0.0rc", false)]
    #[case("1.0.0b", "1.0.0rc", true)]
    #[case("1.0.0rc", "1.0.0", true)]
    #[case("0.2.18", "0.2.18d", false)]
    #[case("1.0.0", "1.0-rc.1", false)]
    #[tokio::test]
    async fn check_reports_whether_latest_is_newer(
        #[case] current: &str,
        #[case] latest: &str,
        #[case] expected: bool,
    ) {
        let result = checker_returning(current, latest).check().await;

        assert_eq!(result.has_update(), expected);
        assert_eq!(result.is_newer(), expected);
        assert_eq!(result.error_message(), None);
    }

    #[tokio::test]
    async fn check_passes_release_fields_through_unmodified() {
        let result = checker_returning("v0.2.18", "v0.2.19").check().await;

        assert_eq!(
            result,
            VersionCheckResult {
                has_update: true,
                current_version: "v0.2.18".to_string(),
                latest_version: "v0.2.19".to_string(),
                download_url: "https://github.com/owner/app/releases/tag/v0.2.19".to_string(),
                release_notes: "notes".to_string(),
                published_date: "2024-01-15T00:00:00Z".to_string(),
                error_message: None,
                error_kind: None,
                is_newer: true,
            }
        );
    }

    #[tokio::test]
    async fn check_rejects_invalid_repository_without_fetching() {
        let mut fetcher = MockReleaseFetcher::new();
        fetcher.expect_fetch_latest_release().times(0);
        let checker = UpdateChecker::with_fetcher(
            CheckConfig::new("not a repository", "1.0.0"),
            Arc::new(fetcher),
        );

        let result = checker.check().await;

        assert!(!result.has_update());
        assert_eq!(
            result.error_kind(),
            Some(ErrorKind::InvalidRepositoryFormat)
        );
        assert_eq!(
            result.error_message(),
            Some(RepositoryError::InvalidFormat("not a repository".to_string()).to_string())
                .as_deref()
        );
    }

    #[rstest]
    #[case(|| FetchError::NoReleasesFound("owner/app".to_string()), ErrorKind::NoReleasesFound)]
    #[case(|| FetchError::Http { status: 502 }, ErrorKind::HttpError)]
    #[case(|| FetchError::Timeout(10), ErrorKind::Timeout)]
    #[case(|| FetchError::MalformedResponse("eof".to_string()), ErrorKind::MalformedResponse)]
    #[tokio::test]
    async fn check_converts_fetch_errors_into_result(
        #[case] error: fn() -> FetchError,
        #[case] expected: ErrorKind,
    ) {
        let result = checker_failing("1.0.0", error).check().await;

        assert!(!result.has_update());
        assert!(!result.is_newer());
        assert_eq!(result.error_kind(), Some(expected));
        assert!(!result.error_message().unwrap_or_default().is_empty());
        assert_eq!(result.current_version(), "1.0.0");
        assert_eq!(result.latest_version(), "");
    }

    #[tokio::test]
    async fn check_names_missing_releases_in_message() {
        let result = checker_failing("1.0.0", || {
            FetchError::NoReleasesFound("owner/app".to_string())
        })
        .check()
        .await;

        assert_eq!(
            result.error_message(),
            Some("No releases found for owner/app")
        );
    }

    struct SlowFetcher;

    #[async_trait::async_trait]
    impl ReleaseFetcher for SlowFetcher {
        async fn fetch_latest_release(
            &self,
            _repository: &RepositoryRef,
        ) -> Result<ReleaseRecord, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(release("9.9.9"))
        }
    }

    #[tokio::test]
    async fn check_times_out_slow_fetcher() {
        let checker = UpdateChecker::with_fetcher(
            CheckConfig::new("owner/app", "1.0.0").with_timeout_secs(1),
            Arc::new(SlowFetcher),
        );

        let result = checker.check().await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Timeout));
        assert!(!result.has_update());
    }

    #[test]
    fn get_latest_version_blocks_until_complete() {
        let result = checker_returning("0.2.18", "0.2.19").get_latest_version();

        assert!(result.has_update());
        assert_eq!(result.latest_version(), "0.2.19");
    }

    #[tokio::test]
    async fn get_latest_version_works_inside_runtime() {
        let result = checker_returning("0.2.18", "0.2.19").get_latest_version();

        assert!(result.has_update());
    }

    struct PanickingFetcher;

    #[async_trait::async_trait]
    impl ReleaseFetcher for PanickingFetcher {
        async fn fetch_latest_release(
            &self,
            _repository: &RepositoryRef,
        ) -> Result<ReleaseRecord, FetchError> {
            panic!("fetcher exploded")
        }
    }

    #[test]
    fn get_latest_version_converts_panic_into_error_result() {
        let checker = UpdateChecker::with_fetcher(
            CheckConfig::new("owner/app", "1.0.0"),
            Arc::new(PanickingFetcher),
        );

        let result = checker.get_latest_version();

        assert_eq!(result.error_kind(), Some(ErrorKind::Internal));
        assert!(!result.has_update());
    }

    #[test]
    fn check_for_updates_invokes_callback_exactly_once() {
        let (tx, rx) = mpsc::channel();

        let handle = checker_returning("0.2.18", "0.2.19").check_for_updates(move |result| {
            tx.send(result).unwrap();
        });
        handle.join().unwrap();

        let result = rx.recv().unwrap();
        assert!(result.has_update());
        assert_eq!(result.latest_version(), "0.2.19");
        // Sender was moved into the callback and dropped after one send
        assert!(rx.recv().is_err());
    }

    #[test]
    fn check_for_updates_invokes_callback_even_when_fetcher_panics() {
        let checker = UpdateChecker::with_fetcher(
            CheckConfig::new("owner/app", "1.0.0"),
            Arc::new(PanickingFetcher),
        );
        let (tx, rx) = mpsc::channel();

        checker
            .check_for_updates(move |result| tx.send(result).unwrap())
            .join()
            .unwrap();

        assert_eq!(rx.recv().unwrap().error_kind(), Some(ErrorKind::Internal));
    }

    #[test]
    fn check_for_updates_delivers_error_results() {
        let (tx, rx) = mpsc::channel();

        checker_failing("1.0.0", || FetchError::Http { status: 500 })
            .check_for_updates(move |result| tx.send(result).unwrap())
            .join()
            .unwrap();

        let result = rx.recv().unwrap();
        assert_eq!(result.error_kind(), Some(ErrorKind::HttpError));
    }

    struct GatedFetcher {
        gate: std::sync::Mutex<Option<tokio::sync::oneshot::Receiver<ReleaseRecord>>>,
    }

    #[async_trait::async_trait]
    impl ReleaseFetcher for GatedFetcher {
        async fn fetch_latest_release(
            &self,
            _repository: &RepositoryRef,
        ) -> Result<ReleaseRecord, FetchError> {
            let gate = self.gate.lock().unwrap().take().unwrap();
            gate.await
                .map_err(|e| FetchError::MalformedResponse(e.to_string()))
        }
    }

    #[test]
    fn check_for_updates_returns_before_fetch_completes() {
        let (release_tx, release_rx) = tokio::sync::oneshot::channel();
        let fetcher = GatedFetcher {
            gate: std::sync::Mutex::new(Some(release_rx)),
        };
        let checker =
            UpdateChecker::with_fetcher(CheckConfig::new("owner/app", "0.2.18"), Arc::new(fetcher));
        let (tx, rx) = mpsc::channel();

        let handle = checker.check_for_updates(move |result| tx.send(result).unwrap());

        // Fetch is still waiting on the gate
        assert!(rx.try_recv().is_err());

        release_tx.send(release("0.2.19")).unwrap();
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();

        assert!(result.has_update());
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let result = VersionCheckResult::from_error(
            "1.0.0",
            &CheckError::from(FetchError::NoReleasesFound("owner/app".to_string())),
        );

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["hasUpdate"], false);
        assert_eq!(json["isNewer"], false);
        assert_eq!(json["currentVersion"], "1.0.0");
        assert_eq!(json["errorKind"], "no_releases_found");
        assert_eq!(json["errorMessage"], "No releases found for owner/app");
    }
}
