//! Coin Metrics community API source
//!
//! - `GET /catalog/assets` for the asset catalog (single attempt)
//! - `GET /timeseries/asset-metrics/` for the daily series of one asset
//!   (bounded retry)
//!
//! Pagination is left to the server: one request per asset with a fixed
//! page size.

use async_trait::async_trait;
use tracing::debug;

use crate::downloader::config::ExportConfig;
use crate::fetcher::http::MetricsHttpClient;
use crate::fetcher::parser::{DataEnvelope, SeriesEnvelope, SeriesParser};
use crate::fetcher::retry::retry_attempts;
use crate::fetcher::{FetcherError, FetcherResult, MetricsSource, SeriesResponse};
use crate::{AssetCatalogEntry, DAILY_FREQUENCY};

/// Public community API root
pub const DEFAULT_API_ROOT: &str = "https://community-api.coinmetrics.io/v4";

/// Catalog endpoint
pub const CATALOG_ENDPOINT: &str = "/catalog/assets";

/// Asset metrics time-series endpoint
pub const SERIES_ENDPOINT: &str = "/timeseries/asset-metrics/";

/// Default (and maximum) page size accepted by the community API
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// [`MetricsSource`] backed by the community HTTP API.
#[derive(Debug, Clone)]
pub struct CommunityApiSource {
    http: MetricsHttpClient,
    page_size: u32,
    max_attempts: u32,
}

impl CommunityApiSource {
    /// Create a source over an existing HTTP client.
    pub fn new(http: MetricsHttpClient, page_size: u32, max_attempts: u32) -> Self {
        Self {
            http,
            page_size,
            max_attempts,
        }
    }

    /// Create a source for the API root, page size and attempt budget of an
    /// export configuration.
    pub fn from_config(config: &ExportConfig) -> FetcherResult<Self> {
        let http = MetricsHttpClient::with_default_client(config.api_root.as_str())?;
        Ok(Self::new(http, config.page_size, config.max_attempts))
    }

    /// Number of attempts per series request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Page size sent with series requests
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn series_params(&self, asset: &str, metric_ids: &[String]) -> Vec<(&'static str, String)> {
        vec![
            ("assets", asset.to_string()),
            ("metrics", metric_ids.join(",")),
            ("frequency", DAILY_FREQUENCY.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }

    async fn fetch_series_once(&self, params: &[(&str, String)]) -> FetcherResult<SeriesResponse> {
        let response = self.http.get::<SeriesEnvelope>(SERIES_ENDPOINT, params).await?;
        let envelope = response.body;
        let rows = envelope.data.map(SeriesParser::parse_rows).transpose()?;

        Ok(SeriesResponse {
            rows,
            next_page_token: envelope.next_page_token.or(envelope.next_page_url),
            status: response.status,
        })
    }
}

#[async_trait]
impl MetricsSource for CommunityApiSource {
    async fn fetch_catalog(&self) -> FetcherResult<Vec<AssetCatalogEntry>> {
        let response = self
            .http
            .get::<DataEnvelope<Vec<AssetCatalogEntry>>>(CATALOG_ENDPOINT, &[])
            .await
            .map_err(|e| FetcherError::CatalogUnavailable {
                last_status: e.status(),
                reason: e.to_string(),
            })?;

        let catalog = response.body.data.ok_or_else(|| FetcherError::CatalogUnavailable {
            last_status: Some(response.status),
            reason: "response has no data".to_string(),
        })?;
        debug!("Catalog lists {} assets", catalog.len());
        Ok(catalog)
    }

    async fn fetch_series(&self, asset: &str, metric_ids: &[String]) -> FetcherResult<SeriesResponse> {
        let params = self.series_params(asset, metric_ids);
        let params = params.as_slice();

        retry_attempts(asset, self.max_attempts, |_attempt| self.fetch_series_once(params)).await
    }

    fn base_url(&self) -> &str {
        self.http.base_url()
    }
}
