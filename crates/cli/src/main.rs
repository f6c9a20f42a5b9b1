//! Cart driver entry point.

use std::process::ExitCode;

use cli::{Config, LogFormat};
use common::UuidIdGenerator;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the tracing subscriber. Logs go to stderr so stdout carries
/// only the report.
fn init_tracing(config: &Config) {
    let registry = tracing_subscriber::registry().with(EnvFilter::new(&config.log_level));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => registry.with(layer.json()).init(),
        LogFormat::Pretty => registry.with(layer).init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Read the script
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: cart <script.json | ->");
        return ExitCode::from(2);
    };

    let steps = match cli::read_script(&path).await {
        Ok(steps) => steps,
        Err(err) => {
            tracing::error!(error = %err, "failed to load script");
            return ExitCode::FAILURE;
        }
    };

    // 3. Run it against a fresh in-memory store
    let report = match cli::run_script(&config, &UuidIdGenerator, &steps).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "script aborted");
            return ExitCode::FAILURE;
        }
    };

    // 4. Print the report
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize report");
            ExitCode::FAILURE
        }
    }
}
