//! Integration tests for logging and tracing

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use asset_metrics_downloader::fetcher::retry::RetryContext;
use asset_metrics_downloader::fetcher::FetcherError;

#[test]
fn test_json_subscriber_initialization() {
    let result = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("asset_metrics_downloader=debug"))
        .with_test_writer()
        .try_init();

    // Another test may have installed a subscriber first
    let _ = result;

    info!("Fetching btc data with 2 metrics... (1/3)");
    debug!("Pausing for 600ms");
    warn!("Fetch attempt 1/5 failed (server error 500) for btc. Retrying...");
}

#[test]
fn test_verbose_and_default_filters_parse() {
    for directive in [
        "asset_metrics_downloader=info",
        "asset_metrics_downloader=debug",
    ] {
        assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
        let _ = EnvFilter::new(directive);
    }
}

#[test]
fn test_retry_messages_name_target_and_attempt() {
    let err = FetcherError::StatusError {
        status: 500,
        body: "busy".to_string(),
    };
    let ctx = RetryContext::new(2, 5, "btc", &err);

    let retry = ctx.format_retry();
    assert!(retry.contains("2/5"));
    assert!(retry.contains("btc"));

    let failure = ctx.format_failure();
    assert!(failure.contains("btc"));
}
