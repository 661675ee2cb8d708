//! SEOLens HTTP Server
//!
//! Thin HTTP shell over the scan pipeline. Core logic lives in the `crates/`
//! directory; this crate wires configuration, state and routes together.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod extractors;
pub mod ratelimit;
#[allow(missing_docs)]
pub mod routes;
pub mod sitemap;
pub mod state;

pub use error::ApiError;
pub use ratelimit::{InMemoryRateLimiter, RateLimiter};
pub use state::AppState;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use seolens_core::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .merge(routes::api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,seolens=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Serve the API until the process is interrupted.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting SEOLens v{}", env!("CARGO_PKG_VERSION"));

    let limiter = InMemoryRateLimiter::new();
    spawn_limiter_sweep(limiter.clone(), config.rate_limit.window_secs);

    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::from_config(config, Arc::new(limiter)).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

fn spawn_limiter_sweep(limiter: InMemoryRateLimiter, window_secs: u64) {
    let period = Duration::from_secs(window_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            limiter.purge_expired().await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
