//! Release lookup
//!
//! - [`fetcher`]: `ReleaseFetcher` trait, the seam the checker talks to
//! - [`github`]: GitHub Releases API implementation
//! - [`types`]: `ReleaseRecord`

pub mod fetcher;
pub mod github;
pub mod types;

pub use fetcher::ReleaseFetcher;
pub use github::GitHubReleaseFetcher;
pub use types::ReleaseRecord;
