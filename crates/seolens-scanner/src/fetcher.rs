//! Fetch orchestrator.
//!
//! Wraps an [`HttpTransport`] with the scan's status policy:
//!
//! - 429 waits a fixed backoff and retries, up to `max_attempts` requests in
//!   total, then fails with [`FetchError::RetriesExhausted`]
//! - 403 defers to the search-index [`FallbackProvider`], if one is configured
//! - any other status from 400 up fails with [`FetchError::Status`]
//!
//! Every request, backoff sleep and fallback call races the caller's
//! [`CancellationToken`].

use crate::error::FetchError;
use crate::fallback::FallbackProvider;
use crate::transport::HttpTransport;
use seolens_core::FetchSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const RATE_LIMITED: u16 = 429;
const FORBIDDEN: u16 = 403;

/// Retry budget for rate-limited targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total requests, including the first
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchSettings::default())
    }
}

impl From<&FetchSettings> for RetryPolicy {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            backoff: settings.backoff(),
        }
    }
}

/// Where a fetched body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The target answered directly
    Direct,
    /// The search-index fallback answered; the body is its JSON payload
    Fallback,
}

/// A successfully fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Response body
    pub body: String,
    /// HTTP status reported for the body
    pub status: u16,
    /// Origin of the body
    pub source: FetchSource,
    /// Direct requests made, including retries
    pub attempts: u32,
}

/// Fetches pages under the retry and fallback policy.
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    fallback: Option<Arc<dyn FallbackProvider>>,
    policy: RetryPolicy,
}

impl PageFetcher {
    /// Create a fetcher. Without a fallback provider, 403 responses fail.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        fallback: Option<Arc<dyn FallbackProvider>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            fallback,
            policy,
        }
    }

    /// The retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url`.
    ///
    /// # Errors
    /// See the module documentation for the status policy. Transport failures
    /// are returned as-is and `FetchError::Cancelled` is returned as soon as
    /// `cancel` fires.
    pub async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled(url)),
                result = self.transport.get(url) => result?,
            };

            match response.status {
                RATE_LIMITED => {
                    tracing::warn!(url, attempt, max_attempts, "Target rate limited the scanner");
                    if attempt < max_attempts {
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => return Err(cancelled(url)),
                            () = tokio::time::sleep(self.policy.backoff) => {}
                        }
                    }
                }
                FORBIDDEN => {
                    tracing::info!(url, attempt, "Target refused direct fetch, using fallback");
                    return self.fetch_via_fallback(url, attempt, cancel).await;
                }
                status if status >= 400 => {
                    tracing::warn!(url, status, "Fetch failed");
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                status => {
                    tracing::debug!(url, status, attempt, "Fetched page");
                    return Ok(FetchedPage {
                        body: response.body,
                        status,
                        source: FetchSource::Direct,
                        attempts: attempt,
                    });
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
        })
    }

    async fn fetch_via_fallback(
        &self,
        url: &str,
        attempts: u32,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let Some(provider) = &self.fallback else {
            return Err(FetchError::FallbackUnavailable {
                url: url.to_string(),
                reason: "no fallback provider configured".to_string(),
            });
        };

        let query = format!("site:{url}");
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(url)),
            result = provider.search(&query) => result,
        };

        let payload = result.map_err(|e| {
            tracing::warn!(url, provider = provider.provider_id(), error = %e, "Fallback failed");
            FetchError::FallbackUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(FetchedPage {
            body: payload.to_string(),
            status: 200,
            source: FetchSource::Fallback,
            attempts,
        })
    }
}

fn cancelled(url: &str) -> FetchError {
    tracing::debug!(url, "Fetch cancelled");
    FetchError::Cancelled {
        url: url.to_string(),
    }
}
