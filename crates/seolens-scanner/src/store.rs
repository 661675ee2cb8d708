//! Persistence seam used by the scan coordinator.

use async_trait::async_trait;
use seolens_db::{scans, sites, Audit, Database, DatabaseError, Page, ScanRecord, Site};

/// Records a scan leaves behind.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Site `site_id`, only if it belongs to `owner_id`.
    async fn find_site(&self, owner_id: &str, site_id: &str) -> Result<Option<Site>, DatabaseError>;

    /// The owner's site for `domain`.
    async fn find_site_by_domain(
        &self,
        owner_id: &str,
        domain: &str,
    ) -> Result<Option<Site>, DatabaseError>;

    /// Register a new site.
    async fn create_site(&self, owner_id: &str, domain: &str, url: &str)
        -> Result<Site, DatabaseError>;

    /// Record the audit and refresh the page keyed by `(site_id, url)`,
    /// atomically.
    async fn record_scan(&self, record: &ScanRecord<'_>) -> Result<(Audit, Page), DatabaseError>;
}

#[async_trait]
impl ScanStore for Database {
    async fn find_site(&self, owner_id: &str, site_id: &str) -> Result<Option<Site>, DatabaseError> {
        Ok(sites::find_site(self.pool(), owner_id, site_id).await?)
    }

    async fn find_site_by_domain(
        &self,
        owner_id: &str,
        domain: &str,
    ) -> Result<Option<Site>, DatabaseError> {
        Ok(sites::find_site_by_domain(self.pool(), owner_id, domain).await?)
    }

    async fn create_site(
        &self,
        owner_id: &str,
        domain: &str,
        url: &str,
    ) -> Result<Site, DatabaseError> {
        Ok(sites::create_site(self.pool(), owner_id, domain, url).await?)
    }

    async fn record_scan(&self, record: &ScanRecord<'_>) -> Result<(Audit, Page), DatabaseError> {
        scans::record_scan(self.pool(), record).await
    }
}
