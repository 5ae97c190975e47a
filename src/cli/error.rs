//! CLI error types and conversions

use crate::downloader::DownloadError;
use crate::fetcher::FetcherError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Export run failed
    #[error("{0}")]
    DownloadError(#[from] DownloadError),

    /// API client could not be built
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Last HTTP status known for the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CliError::DownloadError(e) => e.status(),
            CliError::FetcherError(e) => e.status(),
            CliError::InvalidArgument(_) => None,
        }
    }
}
