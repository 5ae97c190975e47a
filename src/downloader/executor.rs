//! Export executor
//!
//! Runs the pipeline `BuildingCatalog → FilteringAssets → IteratingAssets →
//! Done`. Any fatal error moves the executor to `Fatal` and ends the run;
//! there is no partial-completion recovery.

use indicatif::ProgressBar;
use std::fmt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::catalog::{daily_metric_ids, AssetIndex};
use crate::downloader::config::ExportConfig;
use crate::downloader::rate_limit::RateGovernor;
use crate::downloader::DownloadError;
use crate::fetcher::MetricsSource;
use crate::output::{CsvSeriesWriter, WrittenFile};

/// Pipeline state of an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Not started
    Idle,
    /// Fetching the asset catalog
    BuildingCatalog,
    /// Applying the omission rule and sorting
    FilteringAssets,
    /// Processing asset `current` (1-based) of `total`
    IteratingAssets {
        /// Position of the asset being processed
        current: usize,
        /// Number of assets to process
        total: usize,
    },
    /// All assets processed
    Done,
    /// Run aborted
    Fatal,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportPhase::Idle => write!(f, "idle"),
            ExportPhase::BuildingCatalog => write!(f, "building catalog"),
            ExportPhase::FilteringAssets => write!(f, "filtering assets"),
            ExportPhase::IteratingAssets { current, total } => {
                write!(f, "processing asset {current}/{total}")
            }
            ExportPhase::Done => write!(f, "done"),
            ExportPhase::Fatal => write!(f, "fatal"),
        }
    }
}

/// Why an asset produced no file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No metric is published at daily frequency
    NoDailyMetrics,
    /// Requested explicitly but absent from the filtered catalog
    NotInCatalog,
}

/// Result of processing one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// A CSV file was written
    Written(WrittenFile),
    /// Nothing to fetch
    Skipped(SkipReason),
}

/// Totals of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Assets in the processing order
    pub assets_total: usize,
    /// Files written
    pub written: usize,
    /// Assets skipped
    pub skipped: usize,
    /// Series that the server cut at the page size
    pub truncated: usize,
    /// Data rows written across all files
    pub rows_written: usize,
    /// Bytes written across all files
    pub bytes_written: usize,
}

impl ExportSummary {
    fn record(&mut self, outcome: &AssetOutcome) {
        match outcome {
            AssetOutcome::Written(file) => {
                self.written += 1;
                self.rows_written += file.rows;
                self.bytes_written += file.bytes;
            }
            AssetOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Orchestrates an export run.
pub struct ExportExecutor {
    source: Box<dyn MetricsSource>,
    config: ExportConfig,
    writer: CsvSeriesWriter,
    governor: RateGovernor,
    phase: ExportPhase,
    truncated: usize,
    progress: Option<ProgressBar>,
}

impl ExportExecutor {
    /// Create an executor for `source` and `config`.
    pub fn new(source: impl MetricsSource + 'static, config: ExportConfig) -> Self {
        let writer = CsvSeriesWriter::new(config.output_dir.clone());
        let governor = RateGovernor::new(config.throttle, config.min_fetch_interval);
        Self {
            source: Box::new(source),
            config,
            writer,
            governor,
            phase: ExportPhase::Idle,
            truncated: 0,
            progress: None,
        }
    }

    /// Advance `progress` by one per processed asset.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Current pipeline state
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Configuration of this run
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// # Errors
    /// Returns the first fatal error; the executor is then in
    /// [`ExportPhase::Fatal`].
    pub async fn run(&mut self) -> Result<ExportSummary, DownloadError> {
        match self.run_pipeline().await {
            Ok(summary) => {
                self.phase = ExportPhase::Done;
                info!(
                    "Finished: {} files written, {} assets skipped",
                    summary.written, summary.skipped
                );
                Ok(summary)
            }
            Err(e) => {
                self.phase = ExportPhase::Fatal;
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self) -> Result<ExportSummary, DownloadError> {
        let index = self.build_index().await?;
        let order = index.processing_order(self.config.asset_filter.as_deref());
        let total = order.len();

        info!(
            "Exporting {} of {} assets from {} to {}",
            total,
            index.len(),
            self.source.base_url(),
            self.config.output_dir.display()
        );
        if let Some(progress) = &self.progress {
            progress.set_length(total as u64);
        }

        let mut summary = ExportSummary {
            assets_total: total,
            ..ExportSummary::default()
        };

        for (i, asset) in order.iter().enumerate() {
            self.phase = ExportPhase::IteratingAssets {
                current: i + 1,
                total,
            };
            if let Some(progress) = &self.progress {
                progress.set_message(asset.clone());
            }

            let outcome = self.process_asset(&index, asset, i + 1, total).await?;
            summary.record(&outcome);

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }
        summary.truncated = self.truncated;

        Ok(summary)
    }

    /// Fetch the catalog and build the asset index.
    async fn build_index(&mut self) -> Result<AssetIndex, DownloadError> {
        self.phase = ExportPhase::BuildingCatalog;
        let catalog = self
            .source
            .fetch_catalog()
            .await
            .map_err(DownloadError::CatalogError)?;

        self.phase = ExportPhase::FilteringAssets;
        let listed = catalog.len();
        let index = AssetIndex::build(catalog);
        debug!("Retained {} of {} catalog assets", index.len(), listed);

        Ok(index)
    }

    /// Process one asset: rate gate, metric selection, fetch, write, pause.
    pub async fn process_asset(
        &mut self,
        index: &AssetIndex,
        asset: &str,
        position: usize,
        total: usize,
    ) -> Result<AssetOutcome, DownloadError> {
        self.governor.wait_turn().await;

        let Some(entry) = index.get(asset) else {
            warn!("Skipping asset: {} because it is not in the catalog", asset);
            return Ok(AssetOutcome::Skipped(SkipReason::NotInCatalog));
        };
        let metric_ids = daily_metric_ids(entry);

        info!(
            "Fetching {} data with {} metrics... ({}/{})",
            asset,
            metric_ids.len(),
            position,
            total
        );
        self.governor.mark_fetch_start();

        if metric_ids.is_empty() {
            info!("Skipping asset: {} because there is no available metrics", asset);
            return Ok(AssetOutcome::Skipped(SkipReason::NoDailyMetrics));
        }

        let response = self
            .source
            .fetch_series(asset, &metric_ids)
            .await
            .map_err(|source| DownloadError::SeriesError {
                asset: asset.to_string(),
                source,
            })?;

        if response.is_truncated() {
            self.truncated += 1;
            warn!(
                "Series for {} exceeds the page size of {}; output is truncated",
                asset, self.config.page_size
            );
        }

        let status = response.status;
        let rows = match response.rows {
            Some(rows) if !rows.is_empty() => rows,
            _ => {
                return Err(DownloadError::EmptySeriesResult {
                    asset: asset.to_string(),
                    last_status: Some(status),
                })
            }
        };

        let written = self.writer.write_asset(asset, &metric_ids, &rows)?;

        if !self.config.post_asset_pause.is_zero() {
            sleep(self.config.post_asset_pause).await;
        }

        Ok(AssetOutcome::Written(written))
    }
}
