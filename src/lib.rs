//! # Asset Metrics Downloader Library
//!
//! Batch exporter for daily asset metrics published by the Coin Metrics
//! community API. One run fetches the asset catalog, picks the metrics each
//! asset publishes at daily frequency, downloads their time series and writes
//! one CSV file per asset.
//!
//! ## Quick Start
//!
//! ```no_run
//! use asset_metrics_downloader::downloader::{ExportConfig, ExportExecutor};
//! use asset_metrics_downloader::fetcher::CommunityApiSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::new("./data");
//! let source = CommunityApiSource::from_config(&config)?;
//!
//! let summary = ExportExecutor::new(source, config).run().await?;
//! println!("wrote {} files", summary.written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - Asset filtering, daily metric selection and the asset index
//! - [`fetcher`] - HTTP client, retry loop and the remote metrics source
//! - [`downloader`] - Export configuration, rate governor and orchestration
//! - [`output`] - CSV rendering and output paths
//! - [`cli`] - Command line interface
//!
//! Processing is strictly sequential: one asset at a time, one request in
//! flight at a time.

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Catalog index and per-asset selection rules
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// Export orchestration
pub mod downloader;

/// Remote API access
pub mod fetcher;

/// CSV output
pub mod output;

pub use catalog::AssetIndex;

/// Frequency label for daily metrics.
pub const DAILY_FREQUENCY: &str = "1d";

/// Prefix shared by price reference-rate metrics, which are never exported.
pub const REFERENCE_RATE_PREFIX: &str = "ReferenceRate";

/// One asset of the remote catalog together with the metrics it publishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetCatalogEntry {
    /// Asset identifier (e.g. "btc")
    pub asset: String,
    /// Metrics available for the asset; the API omits the field for some assets
    #[serde(default)]
    pub metrics: Option<Vec<MetricDescriptor>>,
}

impl AssetCatalogEntry {
    /// Metrics of this asset, empty when the catalog listed none.
    pub fn metrics(&self) -> &[MetricDescriptor] {
        self.metrics.as_deref().unwrap_or(&[])
    }
}

/// A metric and the sampling frequencies it is published at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDescriptor {
    /// Metric identifier (e.g. "PriceUSD")
    pub metric: String,
    /// Supported frequencies
    #[serde(default)]
    pub frequencies: Vec<FrequencyDescriptor>,
}

impl MetricDescriptor {
    /// Whether the metric is published at the given frequency.
    pub fn supports(&self, frequency: &str) -> bool {
        self.frequencies.iter().any(|f| f.frequency == frequency)
    }
}

/// Frequency entry of a catalog metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrequencyDescriptor {
    /// Frequency label (e.g. "1d", "1b")
    pub frequency: String,
    /// First available observation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_time: Option<String>,
    /// Last available observation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<String>,
}

/// A single observed metric value, kept as the API sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// JSON number
    Number(serde_json::Number),
    /// JSON string (the API usually sends decimals as strings)
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Values of one asset for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    /// Observation day (timestamp truncated to the date)
    pub date: NaiveDate,
    /// Metric values keyed by metric identifier; missing metrics are absent
    pub values: HashMap<String, MetricValue>,
}

impl ObservationRow {
    /// Create an empty row for a day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: HashMap::new(),
        }
    }

    /// Builder-style helper to attach a value.
    pub fn with_value(mut self, metric: impl Into<String>, value: MetricValue) -> Self {
        self.values.insert(metric.into(), value);
        self
    }

    /// Value of a metric on this day, if the API reported one.
    pub fn value(&self, metric: &str) -> Option<&MetricValue> {
        self.values.get(metric)
    }
}

/// Observations for one asset, in the order the API returned them.
pub type SeriesResult = Vec<ObservationRow>;
