//! End-to-end export runs against a mocked community API

use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use asset_metrics_downloader::downloader::{DownloadError, ExportExecutor, ExportPhase};
use asset_metrics_downloader::fetcher::{CommunityApiSource, FetcherError};

use crate::common::{catalog_asset, fast_config, mount_catalog, series_body, CATALOG_PATH, SERIES_PATH};

#[tokio::test]
async fn test_exports_one_file_per_asset() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        vec![
            catalog_asset("btc", &[("PriceUSD", "1d"), ("ReferenceRateUSD", "1s")]),
            catalog_asset("x", &[("ReferenceRateUSD", "1d")]),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "btc"))
        .and(query_param("metrics", "PriceUSD"))
        .and(query_param("frequency", "1d"))
        .and(query_param("page_size", "10000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(series_body("btc", "PriceUSD", &[("2024-01-01", "42000")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = fast_config(&server, temp_dir.path());
    let source = CommunityApiSource::from_config(&config).unwrap();

    let mut executor = ExportExecutor::new(source, config);
    let summary = executor.run().await.unwrap();

    assert_eq!(summary.assets_total, 1);
    assert_eq!(summary.written, 1);
    assert_eq!(executor.phase(), ExportPhase::Done);

    let csv = fs::read_to_string(temp_dir.path().join("btc.csv")).unwrap();
    assert_eq!(csv, "time,PriceUSD\n2024-01-01,42000\n");

    let files: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().filter_map(Result::ok).collect();
    assert_eq!(files.len(), 1, "only btc.csv should be written");
}

#[tokio::test]
async fn test_restriction_list_order_and_missing_values() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        vec![
            catalog_asset("btc", &[("PriceUSD", "1d")]),
            catalog_asset("eth", &[("PriceUSD", "1d"), ("AdrActCnt", "1d")]),
            catalog_asset("ltc", &[("PriceUSD", "1d")]),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "eth"))
        .and(query_param("metrics", "PriceUSD,AdrActCnt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "asset": "eth", "time": "2024-01-01T00:00:00.000000000Z", "PriceUSD": "2300.5", "AdrActCnt": "512000" },
                { "asset": "eth", "time": "2024-01-02T00:00:00.000000000Z", "PriceUSD": "2310.1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "btc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(series_body("btc", "PriceUSD", &[("2024-01-01", "42000")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = fast_config(&server, temp_dir.path()).with_asset_filter(["eth", "btc"]);
    let source = CommunityApiSource::from_config(&config).unwrap();

    let summary = ExportExecutor::new(source, config).run().await.unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(summary.rows_written, 3);

    let series_requests: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == SERIES_PATH)
        .filter_map(|r| r.url.query_pairs().find(|(k, _)| k == "assets").map(|(_, v)| v.to_string()))
        .collect();
    assert_eq!(series_requests, vec!["eth", "btc"]);

    let csv = fs::read_to_string(temp_dir.path().join("eth.csv")).unwrap();
    assert_eq!(
        csv,
        "time,PriceUSD,AdrActCnt\n2024-01-01,2300.5,512000\n2024-01-02,2310.1,\n"
    );
    assert!(!temp_dir.path().join("ltc.csv").exists());
}

#[tokio::test]
async fn test_asset_without_daily_metrics_makes_no_request() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        vec![
            catalog_asset("btc", &[("PriceUSD", "1d")]),
            catalog_asset("eth", &[("FlowInExUSD", "1b")]),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "btc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(series_body("btc", "PriceUSD", &[("2024-01-01", "1")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "eth"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = fast_config(&server, temp_dir.path());
    let source = CommunityApiSource::from_config(&config).unwrap();

    let summary = ExportExecutor::new(source, config).run().await.unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 1);
    assert!(!temp_dir.path().join("eth.csv").exists());
}

#[tokio::test]
async fn test_catalog_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let config = fast_config(&server, &output_dir);
    let source = CommunityApiSource::from_config(&config).unwrap();

    let mut executor = ExportExecutor::new(source, config);
    let err = executor.run().await.unwrap_err();

    assert!(matches!(
        err,
        DownloadError::CatalogError(FetcherError::CatalogUnavailable { last_status: Some(500), .. })
    ));
    assert_eq!(executor.phase(), ExportPhase::Fatal);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_empty_series_stops_the_run() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        vec![
            catalog_asset("btc", &[("PriceUSD", "1d")]),
            catalog_asset("eth", &[("PriceUSD", "1d")]),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "btc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("assets", "eth"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = fast_config(&server, temp_dir.path());
    let source = CommunityApiSource::from_config(&config).unwrap();

    let err = ExportExecutor::new(source, config).run().await.unwrap_err();
    assert!(matches!(err, DownloadError::EmptySeriesResult { ref asset, .. } if asset == "btc"));
    assert!(!temp_dir.path().join("btc.csv").exists());
}

#[tokio::test]
async fn test_truncated_series_is_still_written() {
    let server = MockServer::start().await;
    mount_catalog(&server, vec![catalog_asset("btc", &[("PriceUSD", "1d")])]).await;

    let mut body = series_body("btc", "PriceUSD", &[("2024-01-01", "1"), ("2024-01-02", "2")]);
    body["next_page_token"] = json!("0.MjAyNC0wMS0wMw");
    body["next_page_url"] = json!("https://community-api.coinmetrics.io/v4/timeseries/asset-metrics?next_page_token=x");
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = fast_config(&server, temp_dir.path());
    config.page_size = 2;
    let source = CommunityApiSource::from_config(&config).unwrap();

    let summary = ExportExecutor::new(source, config).run().await.unwrap();
    assert_eq!(summary.truncated, 1);
    assert_eq!(summary.rows_written, 2);
}
