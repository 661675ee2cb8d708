use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use seolens_core::{Issue, Suggestion};
use seolens_db::Site;
use seolens_scanner::{ScanOutcome, ScanRequest};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::extractors::OwnerId;
use crate::ratelimit::check_rate_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanBody {
    pub url: String,
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub audit: AuditSummary,
    pub analysis: Analysis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub id: String,
    pub score: u8,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub url: String,
    pub site: SiteSummary,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SiteSummary {
    pub id: String,
    pub name: String,
    pub url: String,
    pub domain: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Option<String>,
    pub word_count: usize,
    pub images_count: usize,
    pub images_without_alt: usize,
}

impl From<Site> for SiteSummary {
    fn from(site: Site) -> Self {
        Self {
            id: site.id,
            name: site.name,
            url: site.url,
            domain: site.domain,
        }
    }
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        let ScanOutcome {
            result,
            audit,
            site,
            ..
        } = outcome;
        let signals = result.signals;

        Self {
            success: true,
            analysis: Analysis {
                images_count: signals.images.len(),
                images_without_alt: signals.images_without_alt(),
                word_count: signals.word_count,
                title: signals.title,
                meta_description: signals.meta_description,
                h1: signals.h1,
            },
            audit: AuditSummary {
                id: audit.id,
                score: result.score,
                issues: result.issues,
                suggestions: result.suggestions,
                url: audit.url,
                site: site.into(),
                scanned_at: audit.created_at,
            },
        }
    }
}

/// `POST /api/scan`
pub async fn scan(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    payload: Result<Json<ScanBody>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let limits = &state.config.rate_limit;
    let key = format!("scan:{owner_id}");
    if !check_rate_limit(
        state.limiter.as_ref(),
        &key,
        limits.scan_limit,
        limits.window_secs,
    )
    .await
    {
        return Err(ApiError::too_many_requests());
    }

    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = ScanRequest {
        owner_id,
        url: body.url,
        site_id: body.site_id.filter(|id| !id.is_empty()),
    };

    // Cancels the scan if the client goes away before it finishes.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = state
        .coordinator
        .scan_within(&request, state.config.scan.deadline(), &cancel)
        .await?;

    Ok(Json(outcome.into()))
}
