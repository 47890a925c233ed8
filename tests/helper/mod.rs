//! Shared helpers for integration tests

pub mod github;

pub use github::{release_body, start_github_server};
