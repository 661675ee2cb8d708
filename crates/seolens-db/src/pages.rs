//! Page records: the latest crawl state of each scanned URL, keyed by
//! `(site_id, url)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Pool, Row, Sqlite};

/// Latest crawl state of one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier
    pub id: String,
    /// Owning site
    pub site_id: String,
    /// Page URL
    pub url: String,
    /// Extracted title (`"No Title"` when absent)
    pub title: String,
    /// HTTP status of the last crawl
    pub status: u16,
    /// Word count of the last crawl
    pub word_count: u32,
    /// When the page was last crawled
    pub last_crawled: DateTime<Utc>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

/// Insert or refresh the page keyed by `(site_id, url)`.
///
/// # Errors
/// Returns `sqlx::Error` if the upsert fails.
pub async fn upsert_page(
    pool: &Pool<Sqlite>,
    site_id: &str,
    url: &str,
    title: &str,
    status: u16,
    word_count: u32,
    crawled_at: DateTime<Utc>,
) -> Result<Page, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    upsert_page_on(&mut conn, site_id, url, title, status, word_count, crawled_at).await
}

pub(crate) async fn upsert_page_on(
    conn: &mut SqliteConnection,
    site_id: &str,
    url: &str,
    title: &str,
    status: u16,
    word_count: u32,
    crawled_at: DateTime<Utc>,
) -> Result<Page, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO pages (id, site_id, url, title, status, word_count, last_crawled, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (site_id, url) DO UPDATE SET
             title = excluded.title,
             status = excluded.status,
             word_count = excluded.word_count,
             last_crawled = excluded.last_crawled,
             updated_at = excluded.updated_at",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(site_id)
    .bind(url)
    .bind(title)
    .bind(i64::from(status))
    .bind(i64::from(word_count))
    .bind(crawled_at.to_rfc3339())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query(
        "SELECT id, site_id, url, title, status, word_count, last_crawled, created_at, updated_at
         FROM pages
         WHERE site_id = ? AND url = ?",
    )
    .bind(site_id)
    .bind(url)
    .fetch_one(&mut *conn)
    .await?;

    page_from_row(&row)
}

/// Pages of a site that last answered 200, most recently crawled first.
///
/// # Errors
/// Returns `sqlx::Error` if the query fails.
pub async fn list_live_pages(pool: &Pool<Sqlite>, site_id: &str) -> Result<Vec<Page>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, site_id, url, title, status, word_count, last_crawled, created_at, updated_at
         FROM pages
         WHERE site_id = ? AND status = 200
         ORDER BY last_crawled DESC",
    )
    .bind(site_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(page_from_row).collect()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn page_from_row(row: &SqliteRow) -> Result<Page, sqlx::Error> {
    let status: i64 = row.try_get("status")?;
    let word_count: i64 = row.try_get("word_count")?;
    let last_crawled: String = row.try_get("last_crawled")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Page {
        id: row.try_get("id")?,
        site_id: row.try_get("site_id")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        status: status as u16,
        word_count: word_count as u32,
        last_crawled: parse_timestamp(&last_crawled)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sites, Database};
    use chrono::Duration;

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let db = Database::in_memory().await.expect("create test database");
        let site = sites::create_site(db.pool(), "owner-1", "example.com", "https://example.com")
            .await
            .expect("create site");

        let first_crawl = Utc::now() - Duration::hours(1);
        let created = upsert_page(
            db.pool(),
            &site.id,
            "https://example.com/about",
            "About",
            200,
            120,
            first_crawl,
        )
        .await
        .expect("insert page");
        assert_eq!(created.title, "About");

        let second_crawl = Utc::now();
        let updated = upsert_page(
            db.pool(),
            &site.id,
            "https://example.com/about",
            "About us",
            200,
            480,
            second_crawl,
        )
        .await
        .expect("update page");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "About us");
        assert_eq!(updated.word_count, 480);
        assert!(updated.last_crawled > created.last_crawled);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
            .fetch_one(db.pool())
            .await
            .expect("count pages");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_a_decode_error() {
        let db = Database::in_memory().await.expect("create test database");
        let site = sites::create_site(db.pool(), "owner-1", "example.com", "https://example.com")
            .await
            .expect("create site");

        sqlx::query(
            "INSERT INTO pages (id, site_id, url, title, status, word_count, last_crawled, created_at, updated_at)
             VALUES ('page-x', ?, 'https://example.com/x', 'X', 200, 1, 'not a date', ?, ?)",
        )
        .bind(&site.id)
        .bind(Utc::now().to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(db.pool())
        .await
        .expect("insert raw page");

        let err = list_live_pages(db.pool(), &site.id)
            .await
            .expect_err("timestamp cannot be decoded");
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_list_live_pages_filters_and_orders() {
        let db = Database::in_memory().await.expect("create test database");
        let site = sites::create_site(db.pool(), "owner-1", "example.com", "https://example.com")
            .await
            .expect("create site");

        let now = Utc::now();
        upsert_page(db.pool(), &site.id, "https://example.com/old", "Old", 200, 10, now - Duration::days(2))
            .await
            .expect("insert old page");
        upsert_page(db.pool(), &site.id, "https://example.com/new", "New", 200, 10, now)
            .await
            .expect("insert new page");
        upsert_page(db.pool(), &site.id, "https://example.com/gone", "Gone", 404, 0, now)
            .await
            .expect("insert missing page");

        let pages = list_live_pages(db.pool(), &site.id).await.expect("list pages");
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/new", "https://example.com/old"]);
    }
}
