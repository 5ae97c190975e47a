//! Remote metrics API access

use crate::{AssetCatalogEntry, SeriesResult};
use async_trait::async_trait;

pub mod community_api;
pub mod http;
pub mod parser;
pub mod retry;

pub use community_api::CommunityApiSource;
pub use http::MetricsHttpClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response arrived with a non-success status
    #[error("HTTP status {status}: {body}")]
    StatusError {
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),

    /// The asset catalog could not be retrieved
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable {
        /// Last HTTP status seen, if a response arrived
        last_status: Option<u16>,
        /// Underlying failure
        reason: String,
    },

    /// Every attempt to fetch a series failed
    #[error("failed to fetch data after {attempts} attempts. Reason: {message}")]
    SeriesFetchFailed {
        /// Number of attempts made
        attempts: u32,
        /// Last HTTP status seen, if a response arrived
        last_status: Option<u16>,
        /// Message of the last failure
        message: String,
    },
}

impl FetcherError {
    /// HTTP status associated with the error, where one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetcherError::StatusError { status, .. } => Some(*status),
            FetcherError::CatalogUnavailable { last_status, .. }
            | FetcherError::SeriesFetchFailed { last_status, .. } => *last_status,
            _ => None,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Decoded time-series response for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResponse {
    /// Observations; `None` when the response carried no `data`
    pub rows: Option<SeriesResult>,
    /// Set when the server cut the series at the page size
    pub next_page_token: Option<String>,
    /// HTTP status of the response
    pub status: u16,
}

impl SeriesResponse {
    /// Whether the server reported more pages than were returned.
    pub fn is_truncated(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// Source of catalog and series data.
///
/// The executor only talks to this trait, so tests can substitute a scripted
/// source for the HTTP-backed [`CommunityApiSource`].
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the full asset catalog.
    ///
    /// # Errors
    /// Returns [`FetcherError::CatalogUnavailable`] on any failure. No retry is
    /// attempted.
    async fn fetch_catalog(&self) -> FetcherResult<Vec<AssetCatalogEntry>>;

    /// Fetch the daily series of `metric_ids` for one asset.
    ///
    /// # Arguments
    /// * `asset` - Asset identifier (e.g., "btc")
    /// * `metric_ids` - Non-empty, ordered list of metric identifiers
    ///
    /// # Errors
    /// Returns [`FetcherError::SeriesFetchFailed`] once all attempts failed
    async fn fetch_series(&self, asset: &str, metric_ids: &[String])
        -> FetcherResult<SeriesResponse>;

    /// Base URL of the API behind this source
    fn base_url(&self) -> &str;
}
