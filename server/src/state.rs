//! Application state shared by every handler.

use crate::ratelimit::RateLimiter;
use anyhow::Context;
use seolens_core::AppConfig;
use seolens_db::Database;
use seolens_scanner::{
    FallbackProvider, HttpTransport, PageFetcher, ReqwestTransport, RetryPolicy, ScanCoordinator,
    SerpApiProvider,
};
use std::sync::Arc;

/// Handles to the database, the scan pipeline and the rate limiter.
#[derive(Clone)]
pub struct AppState {
    /// Database for read endpoints
    pub db: Database,
    /// Scan pipeline
    pub coordinator: ScanCoordinator,
    /// Per-caller scan limiter
    pub limiter: Arc<dyn RateLimiter>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Assemble state from explicit parts.
    pub fn new(
        db: Database,
        coordinator: ScanCoordinator,
        limiter: Arc<dyn RateLimiter>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            coordinator,
            limiter,
            config: Arc::new(config),
        }
    }

    /// Open the database and wire the production scan pipeline.
    pub async fn from_config(
        config: AppConfig,
        limiter: Arc<dyn RateLimiter>,
    ) -> anyhow::Result<Self> {
        let db = Database::new(&config.server.database_path)
            .await
            .context("failed to open database")?;
        db.run_migrations()
            .await
            .context("failed to run database migrations")?;

        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::new(&config.fetch).context("failed to build HTTP transport")?,
        );

        let fallback = SerpApiProvider::from_config(&config.fallback)
            .context("failed to build fallback provider")?
            .map(|provider| Arc::new(provider) as Arc<dyn FallbackProvider>);
        if fallback.is_none() {
            tracing::warn!("SERPAPI_KEY not set, pages answering 403 cannot be scanned");
        }

        let fetcher = PageFetcher::new(transport, fallback, RetryPolicy::from(&config.fetch));
        let coordinator = ScanCoordinator::new(Arc::new(fetcher), Arc::new(db.clone()));

        Ok(Self::new(db, coordinator, limiter, config))
    }
}
