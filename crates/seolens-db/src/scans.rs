//! Writes a completed scan as one unit: the audit and the refreshed page
//! commit together or not at all.

use crate::audits::{self, Audit};
use crate::error::Result;
use crate::pages::{self, Page};
use chrono::{DateTime, Utc};
use seolens_core::Assessment;
use sqlx::{Pool, Sqlite};

/// The records one scan leaves behind.
#[derive(Debug, Clone)]
pub struct ScanRecord<'a> {
    /// User who ran the scan
    pub owner_id: &'a str,
    /// Site the scan is filed under
    pub site_id: &'a str,
    /// Scanned URL
    pub url: &'a str,
    /// Score and findings
    pub assessment: &'a Assessment,
    /// Page title to store
    pub title: &'a str,
    /// HTTP status of the crawl
    pub status: u16,
    /// Words on the page
    pub word_count: u32,
    /// When the page was crawled
    pub crawled_at: DateTime<Utc>,
}

/// Insert the audit and upsert the page in a single transaction.
///
/// # Errors
/// Returns `DatabaseError` if either write fails; neither is kept.
pub async fn record_scan(pool: &Pool<Sqlite>, record: &ScanRecord<'_>) -> Result<(Audit, Page)> {
    let mut tx = pool.begin().await?;

    let audit = audits::insert_audit(
        &mut tx,
        record.owner_id,
        record.site_id,
        record.url,
        record.assessment,
    )
    .await?;

    let page = pages::upsert_page_on(
        &mut tx,
        record.site_id,
        record.url,
        record.title,
        record.status,
        record.word_count,
        record.crawled_at,
    )
    .await?;

    tx.commit().await?;
    Ok((audit, page))
}
