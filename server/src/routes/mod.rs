//! HTTP route handlers.

pub mod audits;
pub mod scan;
pub mod sitemap;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Routes under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/scan", post(scan::scan))
        .route("/api/audits/{id}", get(audits::get_audit))
        .route("/api/sitemap/{site_id}", get(sitemap::sitemap))
        .route("/api/sitemap/{site_id}/robots.txt", get(sitemap::robots))
}
