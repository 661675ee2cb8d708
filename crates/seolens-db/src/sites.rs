//! Site records: one per owner and host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// A website owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub owner_id: String,
    /// Display name (the host for auto-created sites)
    pub name: String,
    /// Root URL
    pub url: String,
    /// Host name
    pub domain: String,
    /// How the site was registered (`manual` for scan-created sites)
    pub connector: String,
    /// When the site was created
    pub created_at: DateTime<Utc>,
}

/// Create a site for `owner_id`, named after its domain.
///
/// The owner has at most one site per domain. If one already exists (for
/// example, created by a concurrent scan) that site is returned unchanged.
///
/// # Errors
/// Returns `sqlx::Error` if the insert fails.
pub async fn create_site(
    pool: &Pool<Sqlite>,
    owner_id: &str,
    domain: &str,
    url: &str,
) -> Result<Site, sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO sites (id, owner_id, name, url, domain, connector, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (owner_id, domain) DO NOTHING",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(owner_id)
    .bind(domain)
    .bind(url)
    .bind(domain)
    .bind("manual")
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        tracing::debug!(owner_id, domain, "Site already registered");
    }

    let row = sqlx::query(
        "SELECT id, owner_id, name, url, domain, connector, created_at
         FROM sites
         WHERE owner_id = ? AND domain = ?",
    )
    .bind(owner_id)
    .bind(domain)
    .fetch_one(pool)
    .await?;

    site_from_row(&row)
}

/// Get a site by id, only if it belongs to `owner_id`.
///
/// # Errors
/// Returns `sqlx::Error` if the query fails.
pub async fn find_site(
    pool: &Pool<Sqlite>,
    owner_id: &str,
    site_id: &str,
) -> Result<Option<Site>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, owner_id, name, url, domain, connector, created_at
         FROM sites
         WHERE id = ? AND owner_id = ?",
    )
    .bind(site_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| site_from_row(&r)).transpose()
}

/// Find the owner's site for a host.
///
/// Matches on the stored domain, or on a site URL containing the host.
/// The oldest match wins.
///
/// # Errors
/// Returns `sqlx::Error` if the query fails.
pub async fn find_site_by_domain(
    pool: &Pool<Sqlite>,
    owner_id: &str,
    domain: &str,
) -> Result<Option<Site>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, owner_id, name, url, domain, connector, created_at
         FROM sites
         WHERE owner_id = ? AND (domain = ? OR instr(url, ?) > 0)
         ORDER BY created_at ASC
         LIMIT 1",
    )
    .bind(owner_id)
    .bind(domain)
    .bind(domain)
    .fetch_optional(pool)
    .await?;

    row.map(|r| site_from_row(&r)).transpose()
}

fn site_from_row(row: &SqliteRow) -> Result<Site, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Site {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        domain: row.try_get("domain")?,
        connector: row.try_get("connector")?,
        created_at,
    })
}
