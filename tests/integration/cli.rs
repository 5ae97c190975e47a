//! Binary-level tests: argument handling and exit status

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{api_root, catalog_asset, mount_catalog, series_body, CATALOG_PATH, SERIES_PATH};

const ENV_VARS: [&str; 9] = [
    "OUT",
    "ASSETS",
    "THROTTLE",
    "VERBOSE",
    "API_ROOT",
    "PAGE_SIZE",
    "MAX_ATTEMPTS",
    "THROTTLE_INTERVAL_MS",
    "PAUSE_MS",
];

fn downloader(work_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("asset-metrics-downloader").unwrap();
    // keep a stray .env or exported variable from leaking into the run
    cmd.current_dir(work_dir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_missing_output_dir_fails() {
    let work_dir = TempDir::new().unwrap();
    downloader(&work_dir).assert().failure();
}

#[test]
fn test_invalid_max_attempts_fails() {
    let work_dir = TempDir::new().unwrap();
    downloader(&work_dir)
        .args(["--out", "data", "--max-attempts", "0"])
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_failure_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let work_dir = TempDir::new().unwrap();
    let out = work_dir.path().join("out");
    let root = api_root(&server);

    let mut cmd = downloader(&work_dir);
    cmd.arg("--out").arg(&out).args(["--api-root", &root]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap();

    assert!(!output.status.success());
    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_successful_export_from_environment() {
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
        .respond_with(
            ResponseTemplate::new(200).set_body_json(series_body("btc", "PriceUSD", &[("2024-01-01", "42000")])),
        )
        .mount(&server)
        .await;

    let work_dir = TempDir::new().unwrap();
    let out = work_dir.path().join("out");

    let mut cmd = downloader(&work_dir);
    cmd.env("OUT", &out)
        .env("ASSETS", "btc")
        .env("API_ROOT", api_root(&server))
        .env("PAUSE_MS", "0");
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read_to_string(out.join("btc.csv")).unwrap(),
        "time,PriceUSD\n2024-01-01,42000\n"
    );
    assert!(!out.join("eth.csv").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_numeric_boolean_env_values_enable_throttle_and_verbose() {
    let server = MockServer::start().await;
    mount_catalog(&server, vec![catalog_asset("btc", &[("PriceUSD", "1d")])]).await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(series_body("btc", "PriceUSD", &[("2024-01-01", "42000")])),
        )
        .mount(&server)
        .await;

    let work_dir = TempDir::new().unwrap();
    let out = work_dir.path().join("out");

    let mut cmd = downloader(&work_dir);
    cmd.env("OUT", &out)
        .env("API_ROOT", api_root(&server))
        .env("THROTTLE", "1")
        .env("VERBOSE", "1")
        .env("THROTTLE_INTERVAL_MS", "0")
        .env("PAUSE_MS", "0")
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT");
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(out.join("btc.csv").exists());
    // throttle reaches the run configuration
    assert!(stderr.contains("throttle: true"), "stderr: {stderr}");
    // verbose enables debug traces such as the written-bytes line
    assert!(stderr.contains("Written ~"), "stderr: {stderr}");
}
