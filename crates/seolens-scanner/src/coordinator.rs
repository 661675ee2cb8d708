//! Scan coordinator: validate, fetch, extract, score, resolve the site and
//! persist.
//!
//! Side effects are confined to site resolution and persistence, which only
//! run after the page has been fetched and scored.

use crate::error::{Result, ScanError};
use crate::extractor::extract;
use crate::fallback::substitute_signals;
use crate::fetcher::{FetchSource, FetchedPage, PageFetcher};
use crate::scoring::score;
use crate::store::ScanStore;
use chrono::Utc;
use seolens_core::{ScanResult, SignalSet, TargetUrl};
use seolens_db::{Audit, Page, ScanRecord, Site};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const UNTITLED_PAGE: &str = "No Title";

/// One scan as requested by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Authenticated user running the scan
    pub owner_id: String,
    /// Raw target URL
    pub url: String,
    /// Site to file the scan under; resolved from the URL's host when absent
    pub site_id: Option<String>,
}

/// Everything a completed scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Signals, score and findings
    pub result: ScanResult,
    /// The persisted audit
    pub audit: Audit,
    /// The site the audit was filed under
    pub site: Site,
    /// The refreshed page record
    pub page: Page,
    /// Whether the target or the fallback answered
    pub source: FetchSource,
}

/// Runs scans end to end.
#[derive(Clone)]
pub struct ScanCoordinator {
    fetcher: Arc<PageFetcher>,
    store: Arc<dyn ScanStore>,
}

impl ScanCoordinator {
    /// Create a coordinator.
    pub fn new(fetcher: Arc<PageFetcher>, store: Arc<dyn ScanStore>) -> Self {
        Self { fetcher, store }
    }

    /// Fetch and score `target` without touching the store.
    ///
    /// # Errors
    /// Returns `ScanError::Fetch` if the page cannot be fetched.
    pub async fn analyze(
        &self,
        target: &TargetUrl,
        cancel: &CancellationToken,
    ) -> Result<(ScanResult, FetchSource)> {
        let page = self.fetcher.fetch(target.as_str(), cancel).await?;
        let signals = signals_for(&page);
        let assessment = score(&signals);
        Ok((ScanResult::new(signals, assessment), page.source))
    }

    /// Run a full scan.
    ///
    /// # Errors
    /// - `ScanError::Validation` for a malformed URL
    /// - `ScanError::Fetch` when the page cannot be fetched
    /// - `ScanError::SiteNotFound` when `site_id` is not the owner's
    /// - `ScanError::Persistence` when the audit or page cannot be stored
    pub async fn scan(
        &self,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome> {
        let owner_id = request.owner_id.as_str();
        let target = TargetUrl::parse(&request.url).inspect_err(|e| {
            tracing::info!(url = %request.url, owner_id, error = %e, "Rejected scan request");
        })?;
        let url = target.as_str();

        tracing::info!(url, owner_id, "Starting scan");

        let (result, source) = self.analyze(&target, cancel).await.inspect_err(|e| {
            tracing::warn!(url, owner_id, error = %e, "Scan fetch failed");
        })?;

        let persisted = self.persist(request, &target, &result).await;
        let (audit, site, page) = persisted.inspect_err(|e| {
            tracing::error!(
                url,
                owner_id,
                score = result.score,
                issues = result.issues.len(),
                error = %e,
                "Scan completed but could not be recorded"
            );
        })?;

        tracing::info!(
            url,
            owner_id,
            site_id = %site.id,
            audit_id = %audit.id,
            score = result.score,
            "Scan complete"
        );

        Ok(ScanOutcome {
            result,
            audit,
            site,
            page,
            source,
        })
    }

    /// Run [`scan`](Self::scan) bounded by `deadline`.
    ///
    /// In-flight work is cancelled when the deadline passes.
    ///
    /// # Errors
    /// Returns `ScanError::DeadlineExceeded` on expiry, otherwise whatever
    /// [`scan`](Self::scan) returns.
    pub async fn scan_within(
        &self,
        request: &ScanRequest,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome> {
        let scoped = cancel.child_token();
        if let Ok(outcome) = tokio::time::timeout(deadline, self.scan(request, &scoped)).await {
            outcome
        } else {
            scoped.cancel();
            tracing::warn!(
                url = %request.url,
                owner_id = %request.owner_id,
                deadline_secs = deadline.as_secs(),
                "Scan deadline exceeded"
            );
            Err(ScanError::DeadlineExceeded {
                url: request.url.clone(),
                seconds: deadline.as_secs(),
            })
        }
    }

    async fn persist(
        &self,
        request: &ScanRequest,
        target: &TargetUrl,
        result: &ScanResult,
    ) -> Result<(Audit, Site, Page)> {
        let site = self
            .resolve_site(&request.owner_id, target, request.site_id.as_deref())
            .await?;

        let signals = &result.signals;
        let title = signals
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_PAGE);
        let assessment = result.assessment();

        let (audit, page) = self
            .store
            .record_scan(&ScanRecord {
                owner_id: &request.owner_id,
                site_id: &site.id,
                url: target.as_str(),
                assessment: &assessment,
                title,
                status: signals.http_status,
                word_count: u32::try_from(signals.word_count).unwrap_or(u32::MAX),
                crawled_at: Utc::now(),
            })
            .await?;

        Ok((audit, site, page))
    }

    async fn resolve_site(
        &self,
        owner_id: &str,
        target: &TargetUrl,
        site_id: Option<&str>,
    ) -> Result<Site> {
        if let Some(site_id) = site_id {
            return self
                .store
                .find_site(owner_id, site_id)
                .await?
                .ok_or_else(|| ScanError::SiteNotFound {
                    site_id: site_id.to_string(),
                });
        }

        let host = target.host();
        if let Some(site) = self.store.find_site_by_domain(owner_id, host).await? {
            return Ok(site);
        }

        tracing::info!(owner_id, domain = host, "Creating site for scanned host");
        Ok(self
            .store
            .create_site(owner_id, host, &format!("https://{host}"))
            .await?)
    }
}

fn signals_for(page: &FetchedPage) -> SignalSet {
    match page.source {
        FetchSource::Direct => extract(&page.body, page.status),
        FetchSource::Fallback => serde_json::from_str(&page.body)
            .ok()
            .and_then(|payload| substitute_signals(&payload))
            .unwrap_or_else(|| SignalSet::empty(page.status)),
    }
}
