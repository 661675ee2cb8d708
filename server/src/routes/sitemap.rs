use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use seolens_db::{pages, sites, Site};

use crate::error::ApiError;
use crate::extractors::OwnerId;
use crate::sitemap::{entries_for, render_robots, render_sitemap};
use crate::state::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

async fn owned_site(state: &AppState, owner_id: &str, site_id: &str) -> Result<Site, ApiError> {
    sites::find_site(state.db.pool(), owner_id, site_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Site not found"))
}

/// `GET /api/sitemap/{site_id}`
pub async fn sitemap(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(site_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let site = owned_site(&state, &owner_id, &site_id).await?;
    let live = pages::list_live_pages(state.db.pool(), &site.id).await?;

    tracing::debug!(site_id = %site.id, pages = live.len(), "Rendering sitemap");
    let xml = render_sitemap(&entries_for(&site, &live));

    Ok((
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        xml,
    ))
}

/// `GET /api/sitemap/{site_id}/robots.txt`
pub async fn robots(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(site_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let site = owned_site(&state, &owner_id, &site_id).await?;
    let sitemap_url = format!("{}/sitemap.xml", site.url.trim_end_matches('/'));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        render_robots(&sitemap_url),
    ))
}
