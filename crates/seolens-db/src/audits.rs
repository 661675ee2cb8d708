//! Audit records: the persisted outcome of one scan.
//!
//! Issues and suggestions are stored as JSON arrays in the shape the API
//! returns them.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use seolens_core::{Assessment, Issue, Suggestion};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Pool, Row, Sqlite};

/// A persisted scan outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Unique identifier
    pub id: String,
    /// User who ran the scan
    pub owner_id: String,
    /// Site the scanned URL belongs to
    pub site_id: String,
    /// Scanned URL
    pub url: String,
    /// Score in `0..=100`
    pub score: u8,
    /// Issues in rule order
    pub issues: Vec<Issue>,
    /// Suggestions paired with `issues`
    pub suggestions: Vec<Suggestion>,
    /// When the audit was recorded
    pub created_at: DateTime<Utc>,
}

/// Record an audit for a scanned URL.
///
/// # Errors
/// Returns `DatabaseError` if serialization or the insert fails.
pub async fn create_audit(
    pool: &Pool<Sqlite>,
    owner_id: &str,
    site_id: &str,
    url: &str,
    assessment: &Assessment,
) -> Result<Audit> {
    let mut conn = pool.acquire().await?;
    insert_audit(&mut conn, owner_id, site_id, url, assessment).await
}

pub(crate) async fn insert_audit(
    conn: &mut SqliteConnection,
    owner_id: &str,
    site_id: &str,
    url: &str,
    assessment: &Assessment,
) -> Result<Audit> {
    let audit = Audit {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        site_id: site_id.to_string(),
        url: url.to_string(),
        score: assessment.score,
        issues: assessment.issues.clone(),
        suggestions: assessment.suggestions.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO audits (id, owner_id, site_id, url, score, issues, suggestions, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&audit.id)
    .bind(&audit.owner_id)
    .bind(&audit.site_id)
    .bind(&audit.url)
    .bind(i64::from(audit.score))
    .bind(serde_json::to_string(&audit.issues)?)
    .bind(serde_json::to_string(&audit.suggestions)?)
    .bind(audit.created_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(audit)
}

/// Get an audit by id, only if it belongs to `owner_id`.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or stored JSON is corrupt.
pub async fn get_audit(pool: &Pool<Sqlite>, owner_id: &str, audit_id: &str) -> Result<Option<Audit>> {
    let row = sqlx::query(
        "SELECT id, owner_id, site_id, url, score, issues, suggestions, created_at
         FROM audits
         WHERE id = ? AND owner_id = ?",
    )
    .bind(audit_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| audit_from_row(&r)).transpose()
}

/// List a site's audits, newest first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or stored JSON is corrupt.
pub async fn list_for_site(pool: &Pool<Sqlite>, site_id: &str) -> Result<Vec<Audit>> {
    let rows = sqlx::query(
        "SELECT id, owner_id, site_id, url, score, issues, suggestions, created_at
         FROM audits
         WHERE site_id = ?
         ORDER BY created_at DESC",
    )
    .bind(site_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(audit_from_row).collect()
}

fn audit_from_row(row: &SqliteRow) -> Result<Audit> {
    let issues: String = row.try_get("issues")?;
    let suggestions: String = row.try_get("suggestions")?;

    let score: i64 = row.try_get("score")?;
    let score = u8::try_from(score)
        .map_err(|_| DatabaseError::Decode(format!("audit score out of range: {score}")))?;

    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DatabaseError::Decode(format!("invalid audit timestamp '{created_at}': {e}")))?
        .with_timezone(&Utc);

    Ok(Audit {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        site_id: row.try_get("site_id")?,
        url: row.try_get("url")?,
        score,
        issues: serde_json::from_str(&issues)?,
        suggestions: serde_json::from_str(&suggestions)?,
        created_at,
    })
}
