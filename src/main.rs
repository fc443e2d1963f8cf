//! Bling Portal daemon
//!
//! Wires configuration, logging, metrics and the background inventory
//! refresh loop. The purchase flow itself is driven by an embedding front
//! end through the `bling_portal` library API; this binary keeps the
//! shared counts fresh and the metrics endpoint up.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![warn(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bling_portal::config::Config;
use bling_portal::endpoints;
use bling_portal::inventory::InventoryTracker;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Metrics port (overrides the config value)
    #[arg(long)]
    metrics_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Starting Bling Portal daemon");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    info!("Loading configuration from: {}", args.config);
    let config = load_config(&args.config)?;

    if config.monitoring.enable_metrics {
        let port = args.metrics_port.unwrap_or(config.monitoring.metrics_port);
        info!("Starting metrics server on port {}", port);
        tokio::spawn(async move {
            if let Err(e) = endpoints::endpoint_server(port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let tracker = Arc::new(InventoryTracker::new(client, config.inventory.clone()));
    let refresh_interval = Duration::from_secs(config.inventory.refresh_interval_secs);

    info!(
        "Inventory refresh loop: {} every {}s",
        config.inventory.counts_url, config.inventory.refresh_interval_secs
    );

    run_refresh_loop(tracker, refresh_interval).await;

    info!("Shutting down gracefully...");
    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "bling_portal=debug,info"
    } else {
        "bling_portal=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}

/// Periodic inventory refresh until ctrl-c
async fn run_refresh_loop(tracker: Arc<InventoryTracker>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = tracker.refresh().await;
                info!(
                    single_remaining = snapshot.single_remaining,
                    set_remaining = snapshot.set_remaining,
                    "Inventory counts"
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }
}
