//! Marketplace catalog HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use server::http;
use server::settings::{Args, Settings};
use server::CatalogService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    info!("Starting marketplace server on {}", settings.web.address);

    let store = store::open_store(&settings.store).context("Failed to open store")?;
    let service = Arc::new(CatalogService::new(store, settings.catalog));

    http::serve(service, settings.web.address)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
