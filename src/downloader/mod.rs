//! Export orchestration and rate limiting
//!
//! # Overview
//!
//! The executor drives one complete export run:
//!
//! 1. **Catalog**: fetch the asset catalog once via [`crate::fetcher::MetricsSource`]
//! 2. **Filtering**: build the [`crate::catalog::AssetIndex`]
//! 3. **Iteration**: for every asset, in order: rate gate, metric selection,
//!    series fetch, CSV write, pacing pause
//! 4. **Done**: report an [`ExportSummary`]
//!
//! # Quick Start
//!
//! ```no_run
//! use asset_metrics_downloader::downloader::{ExportConfig, ExportExecutor};
//! use asset_metrics_downloader::fetcher::CommunityApiSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::new("./data")
//!     .with_asset_filter(["eth", "btc"])
//!     .with_throttle(true);
//! let source = CommunityApiSource::from_config(&config)?;
//!
//! let mut executor = ExportExecutor::new(source, config);
//! let summary = executor.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`executor`] - Orchestrator and its state machine
//! - [`rate_limit`] - Minimum-interval gate between fetches
//! - [`config`] - Run configuration and timing constants
//!
//! # Error Handling
//!
//! Every [`DownloadError`] is fatal for the run. Assets without daily metrics
//! are not errors; they are reported as skipped.

use crate::fetcher::FetcherError;
use crate::output::OutputError;

pub mod config;
pub mod executor;
pub mod rate_limit;

pub use config::ExportConfig;
pub use executor::{AssetOutcome, ExportExecutor, ExportPhase, ExportSummary, SkipReason};
pub use rate_limit::RateGovernor;

/// Fatal export errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Catalog could not be fetched; nothing was exported
    #[error("failed to fetch asset info: {0}")]
    CatalogError(#[source] FetcherError),

    /// Series fetch failed for an asset after all attempts
    #[error("failed to fetch data for {asset}: {source}")]
    SeriesError {
        /// Asset being fetched
        asset: String,
        /// Underlying failure
        #[source]
        source: FetcherError,
    },

    /// Series request succeeded but returned no observations
    #[error("failed to fetch data for {asset}: response contained no data")]
    EmptySeriesResult {
        /// Asset being fetched
        asset: String,
        /// Status of the empty response
        last_status: Option<u16>,
    },

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),
}

impl DownloadError {
    /// Last HTTP status known for the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DownloadError::CatalogError(e) | DownloadError::SeriesError { source: e, .. } => e.status(),
            DownloadError::EmptySeriesResult { last_status, .. } => *last_status,
            DownloadError::OutputError(_) => None,
        }
    }
}
