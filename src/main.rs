// =============================================================================
// Meridian Stock Insight — Main Entry Point
// =============================================================================
//
// Deterministic technical-analysis service: fetches daily bars from the
// configured data source and serves scored analysis reports over REST.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analyzer;
mod api;
mod app_state;
mod config;
mod errors;
mod indicators;
mod provider;
mod report;
mod scoring;
mod series;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::AnalysisParams;
use crate::provider::BarProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Meridian Stock Insight — Starting Up              ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    // Fail fast: a misconfigured window or missing data URL must never
    // reach request handling.
    let params = AnalysisParams::from_env()?;
    let provider = BarProvider::from_env()?;

    if std::env::var("MERIDIAN_TOKENS").unwrap_or_default().trim().is_empty() {
        warn!("MERIDIAN_TOKENS is not set — analyze endpoints will reject all requests");
    }

    info!(
        ma_windows = ?[params.ma_short_window, params.ma_medium_window, params.ma_long_window],
        rsi_window = params.rsi_window,
        bollinger_window = params.bollinger_window,
        atr_window = params.atr_window,
        "Analysis parameters loaded"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(params, provider));

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("MERIDIAN_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Meridian Stock Insight shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
