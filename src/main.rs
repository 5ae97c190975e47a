//! Main entry point for the asset-metrics-downloader CLI

use asset_metrics_downloader::cli::{export, Cli};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing(verbose: bool) {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("asset_metrics_downloader={default_level}")));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match cli.to_config() {
        Ok(config) => {
            init_tracing(config.verbose);
            export(config).await
        }
        Err(e) => {
            init_tracing(cli.verbose);
            Err(e)
        }
    };

    let result = result.map_err(|e| {
        let status = e.status();
        (anyhow::anyhow!(e), status)
    });

    if let Err((e, status)) = result {
        match status {
            Some(status) => error!("{} (last status: {})", e, status),
            None => error!("{}", e),
        }
        std::process::exit(1);
    }
}
