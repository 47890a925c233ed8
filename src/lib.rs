//! Check whether a newer GitHub release exists for an application.
//!
//! A check resolves the repository identifier, fetches the latest release,
//! parses both version strings and compares them. The outcome is always a
//! [`VersionCheckResult`]; failures are reported inside it and never escape
//! to the caller.
//!
//! ```no_run
//! use release_check::{CheckConfig, UpdateChecker};
//!
//! let checker = UpdateChecker::new(CheckConfig::new("owner/repo", "0.2.18"));
//!
//! // Blocking
//! let result = checker.get_latest_version();
//! if result.has_update() {
//!     println!("{} is available", result.latest_version());
//! }
//!
//! // Background thread + callback
//! checker.check_for_updates(|result| {
//!     println!("update available: {}", result.is_newer());
//! });
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod release;
pub mod repository;
pub mod version;

pub use checker::{CheckStage, UpdateChecker, VersionCheckResult};
pub use config::CheckConfig;
pub use error::{CheckError, ErrorKind, FetchError, RepositoryError};
pub use repository::RepositoryRef;
pub use version::{ParsedVersion, PrereleaseTag};
