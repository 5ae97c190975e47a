//! Export command
//!
//! Every flag can also be set through the environment variable of the same
//! name in upper case, so the tool runs unchanged from a `.env` file.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::CliError;
use crate::downloader::config::{MIN_FETCH_INTERVAL_MS, POST_ASSET_PAUSE_MS};
use crate::downloader::{ExportConfig, ExportExecutor, ExportSummary};
use crate::fetcher::community_api::{DEFAULT_API_ROOT, DEFAULT_PAGE_SIZE};
use crate::fetcher::CommunityApiSource;

/// Parse a page size in `1..=10000`
fn parse_page_size(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("page size must be at least 1".to_string());
    }
    if value > DEFAULT_PAGE_SIZE {
        return Err(format!(
            "page size {value} exceeds maximum of {DEFAULT_PAGE_SIZE}"
        ));
    }
    Ok(value)
}

/// Export daily asset metrics to one CSV file per asset
#[derive(Parser, Debug, Clone)]
#[command(name = "asset-metrics-downloader", version, about)]
pub struct Cli {
    /// Output directory for `<asset>.csv` files
    #[arg(long, env = "OUT")]
    pub out: PathBuf,

    /// Comma-separated assets to export, in this order (default: all)
    #[arg(long, env = "ASSETS")]
    pub assets: Option<String>,

    /// Keep at least --throttle-interval-ms between the starts of two fetches
    ///
    /// From the environment, any value other than empty, `0`, `false`, `no`
    /// or `off` turns it on.
    #[arg(long, env = "THROTTLE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub throttle: bool,

    /// Log omitted assets, pauses and written bytes
    #[arg(long, env = "VERBOSE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// API root URL
    #[arg(long, env = "API_ROOT", default_value = DEFAULT_API_ROOT)]
    pub api_root: String,

    /// Page size of series requests (max: 10000)
    #[arg(long, env = "PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: u32,

    /// Attempts per series request (default: 5, range: 1-20)
    #[arg(long, env = "MAX_ATTEMPTS", default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_attempts: u32,

    /// Minimum spacing between fetch starts when throttling, in milliseconds
    #[arg(long, env = "THROTTLE_INTERVAL_MS", default_value_t = MIN_FETCH_INTERVAL_MS)]
    pub throttle_interval_ms: u64,

    /// Pause after each written asset, in milliseconds
    #[arg(long, env = "PAUSE_MS", default_value_t = POST_ASSET_PAUSE_MS)]
    pub pause_ms: u64,
}

impl Cli {
    /// Build the run configuration from the parsed flags.
    ///
    /// # Errors
    /// Returns [`CliError::InvalidArgument`] for an empty output path
    pub fn to_config(&self) -> Result<ExportConfig, CliError> {
        if self.out.as_os_str().is_empty() {
            return Err(CliError::InvalidArgument(
                "output directory must not be empty".to_string(),
            ));
        }

        let mut config = ExportConfig::new(self.out.clone())
            .with_throttle(self.throttle)
            .with_verbose(self.verbose)
            .with_timing(
                Duration::from_millis(self.throttle_interval_ms),
                Duration::from_millis(self.pause_ms),
            );
        if let Some(assets) = &self.assets {
            config = config.with_asset_filter(assets.split(','));
        }
        config.api_root = self.api_root.clone();
        config.page_size = self.page_size;
        config.max_attempts = self.max_attempts;

        Ok(config)
    }
}

/// Run the export described by `config` against the community API.
///
/// # Errors
/// Returns the first fatal error of the run
pub async fn export(config: ExportConfig) -> Result<ExportSummary, CliError> {
    info!(
        "Starting export to {} (throttle: {}, restriction: {})",
        config.output_dir.display(),
        config.throttle,
        config
            .asset_filter
            .as_ref()
            .map_or_else(|| "all assets".to_string(), |a| a.join(","))
    );

    let source = CommunityApiSource::from_config(&config)?;
    let progress = create_progress_bar();

    let mut executor = ExportExecutor::new(source, config).with_progress(progress.clone());
    let result = executor.run().await;
    progress.finish_and_clear();

    Ok(result?)
}

/// Per-asset progress bar; the length is set once the asset list is known.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
