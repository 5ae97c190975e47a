//! Export configuration and timing constants

use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::community_api::{DEFAULT_API_ROOT, DEFAULT_PAGE_SIZE};
use crate::fetcher::retry::DEFAULT_MAX_ATTEMPTS;

/// Minimum spacing between the starts of two series fetches when throttling
/// is enabled.
pub const MIN_FETCH_INTERVAL_MS: u64 = 600;

/// Pause after each asset whose file was written, applied regardless of the
/// throttle setting.
pub const POST_ASSET_PAUSE_MS: u64 = 750;

/// Everything the executor needs to know about one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Directory receiving `<asset>.csv` files
    pub output_dir: PathBuf,
    /// Explicit assets to process, in this order; `None` means all
    pub asset_filter: Option<Vec<String>>,
    /// Enforce [`ExportConfig::min_fetch_interval`] between fetches
    pub throttle: bool,
    /// Emit verbose traces
    pub verbose: bool,
    /// API root URL
    pub api_root: String,
    /// Page size sent with series requests
    pub page_size: u32,
    /// Attempts per series request
    pub max_attempts: u32,
    /// Minimum spacing between fetch starts when throttling
    pub min_fetch_interval: Duration,
    /// Pause after each written asset
    pub post_asset_pause: Duration,
}

impl ExportConfig {
    /// Configuration with default API settings and timing.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            asset_filter: None,
            throttle: false,
            verbose: false,
            api_root: DEFAULT_API_ROOT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_fetch_interval: Duration::from_millis(MIN_FETCH_INTERVAL_MS),
            post_asset_pause: Duration::from_millis(POST_ASSET_PAUSE_MS),
        }
    }

    /// Restrict the run to the given assets, processed in the given order.
    ///
    /// Items are trimmed and empty items dropped; an empty list removes the
    /// restriction.
    pub fn with_asset_filter<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let assets: Vec<String> = assets
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self.asset_filter = (!assets.is_empty()).then_some(assets);
        self
    }

    /// Enable or disable throttling
    pub fn with_throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    /// Enable or disable verbose traces
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Override both pacing intervals
    pub fn with_timing(mut self, min_fetch_interval: Duration, post_asset_pause: Duration) -> Self {
        self.min_fetch_interval = min_fetch_interval;
        self.post_asset_pause = post_asset_pause;
        self
    }
}
