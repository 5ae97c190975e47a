//! HTTP client for the metrics API
//!
//! Performs a single GET request and decodes the JSON body. Retrying is the
//! caller's business (see [`crate::fetcher::retry`]); the catalog request is
//! deliberately made only once.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::{FetcherError, FetcherResult};

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - a full page of daily values can be large
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Maximum number of body characters kept in status errors
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Decoded JSON body together with the status it arrived with.
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Decoded body
    pub body: T,
}

/// HTTP client bound to one API root.
#[derive(Debug, Clone)]
pub struct MetricsHttpClient {
    client: Client,
    base_url: String,
}

impl MetricsHttpClient {
    /// Create a client from an existing reqwest [`Client`].
    ///
    /// # Arguments
    /// * `client` - HTTP client (cheap to clone, pools connections internally)
    /// * `base_url` - API root (e.g., "<https://community-api.coinmetrics.io/v4>")
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create a client with the default connect and request timeouts.
    pub fn with_default_client(base_url: impl Into<String>) -> FetcherResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetcherError::NetworkError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::new(client, base_url))
    }

    /// API root this client sends requests to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request and decode the JSON body.
    ///
    /// # Arguments
    /// * `endpoint` - Path below the API root (e.g., "/catalog/assets")
    /// * `params` - Query parameters, URL-encoded by the client
    ///
    /// # Errors
    /// * [`FetcherError::NetworkError`] if the request could not be completed
    /// * [`FetcherError::StatusError`] if the status is not a success
    /// * [`FetcherError::ParseError`] if the body is not the expected JSON
    pub async fn get<T>(&self, endpoint: &str, params: &[(&str, String)]) -> FetcherResult<JsonResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Making GET request to: {} with {} params", url, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetcherError::StatusError {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("Failed to read response body: {e}")))?;
        debug!("Received {} bytes from {}", bytes.len(), url);

        let body = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")))?;

        Ok(JsonResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}
