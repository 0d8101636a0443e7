// =============================================================================
// Dash Finance — Main Entry Point
// =============================================================================
//
// Loads configuration, builds the market data client and the shared
// dashboard service, fetches the ticker universe once, and serves the page
// plus JSON API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod args;
mod cache;
mod chart;
mod config;
mod controller;
mod error;
mod indicators;
mod layout;
mod provider;
mod service;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::DashboardConfig;
use crate::provider::IexClient;
use crate::service::DashboardService;

const CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Dash Finance starting up");

    let mut config = DashboardConfig::load_or_default(CONFIG_PATH);
    config.apply_env();

    if config.provider.token.is_empty() {
        warn!("IEX_TOKEN is not set, provider requests will likely be rejected");
    }

    // ── 2. Market data provider ──────────────────────────────────────────
    let client = IexClient::new(
        config.provider.base_url.clone(),
        config.provider.token.clone(),
        config.provider.timeout(),
    )
    .context("failed to construct market data client")?;
    info!(?client, "market data client ready");

    // ── 3. Shared service & ticker universe ─────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let service = Arc::new(DashboardService::new(Arc::new(client), config));
    let symbols = service.refresh_symbols().await;
    info!(
        symbols,
        source = ?service.symbol_source(),
        cache_ttl_secs = service.config().cache_ttl_secs,
        "ticker universe ready"
    );

    // ── 4. HTTP server ───────────────────────────────────────────────────
    let app = api::rest::router(service);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("shutdown signal received, stopping");
            }
        })
        .await
        .context("HTTP server failed")?;

    info!("Dash Finance shut down complete.");
    Ok(())
}
