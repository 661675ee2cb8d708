use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use seolens_core::{Issue, Suggestion};
use seolens_db::{audits, Audit};
use serde::Serialize;

use crate::error::ApiError;
use crate::extractors::OwnerId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub id: String,
    pub site_id: String,
    pub url: String,
    pub score: u8,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub created_at: DateTime<Utc>,
}

impl From<Audit> for AuditResponse {
    fn from(audit: Audit) -> Self {
        Self {
            id: audit.id,
            site_id: audit.site_id,
            url: audit.url,
            score: audit.score,
            issues: audit.issues,
            suggestions: audit.suggestions,
            created_at: audit.created_at,
        }
    }
}

/// `GET /api/audits/{id}`
pub async fn get_audit(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<String>,
) -> Result<Json<AuditResponse>, ApiError> {
    let audit = audits::get_audit(state.db.pool(), &owner_id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Audit not found"))?;

    Ok(Json(audit.into()))
}
