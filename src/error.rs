use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Invalid repository format: {0:?} (expected owner/repo or a GitHub URL)")]
    InvalidFormat(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("No releases found for {0}")]
    NoReleasesFound(String),

    #[error("Unexpected HTTP status: {status}")]
    Http { status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Category of a failed check, for callers that branch on the cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRepositoryFormat,
    NetworkUnavailable,
    Timeout,
    NoReleasesFound,
    HttpError,
    MalformedResponse,
    /// The check could not run to completion (runtime start failure or panic)
    Internal,
}

impl CheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckError::Repository(RepositoryError::InvalidFormat(_)) => {
                ErrorKind::InvalidRepositoryFormat
            }
            CheckError::Fetch(FetchError::Network(_)) => ErrorKind::NetworkUnavailable,
            CheckError::Fetch(FetchError::Timeout(_)) => ErrorKind::Timeout,
            CheckError::Fetch(FetchError::NoReleasesFound(_)) => ErrorKind::NoReleasesFound,
            CheckError::Fetch(FetchError::Http { .. }) => ErrorKind::HttpError,
            CheckError::Fetch(FetchError::MalformedResponse(_)) => ErrorKind::MalformedResponse,
        }
    }
}
