//! Per-caller request limits.
//!
//! Fixed windows keyed by string: the first hit opens a window of
//! `window_secs`, and hits are allowed while the window's count stays within
//! `limit`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Limiter backend failures.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The counter store could not be reached.
    #[error("rate limit backend unavailable: {0}")]
    Backend(String),
}

/// A fixed-window request counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a hit for `key` and report whether it is within `limit`.
    async fn allow(&self, key: &str, limit: u32, window_secs: u64) -> Result<bool, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    expires_at: Instant,
}

/// Process-local [`RateLimiter`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimiter {
    windows: Arc<RwLock<HashMap<String, Window>>>,
}

impl InMemoryRateLimiter {
    /// Create an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop windows that have expired.
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .write()
            .await
            .retain(|_, window| window.expires_at > now);
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, key: &str, limit: u32, window_secs: u64) -> Result<bool, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let window = windows
            .entry(key.to_string())
            .and_modify(|window| {
                if window.expires_at <= now {
                    *window = Window {
                        count: 0,
                        expires_at: now + Duration::from_secs(window_secs),
                    };
                }
            })
            .or_insert(Window {
                count: 0,
                expires_at: now + Duration::from_secs(window_secs),
            });

        window.count = window.count.saturating_add(1);
        Ok(window.count <= limit)
    }
}

/// Check `key` against `limit`, allowing the request if the limiter fails.
pub async fn check_rate_limit(
    limiter: &dyn RateLimiter,
    key: &str,
    limit: u32,
    window_secs: u64,
) -> bool {
    match limiter.allow(key, limit, window_secs).await {
        Ok(allowed) => {
            if !allowed {
                tracing::info!(key, limit, window_secs, "Rate limit exceeded");
            }
            allowed
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Rate limiter unavailable, allowing request");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenLimiter;

    #[async_trait]
    impl RateLimiter for BrokenLimiter {
        async fn allow(&self, _key: &str, _limit: u32, _window: u64) -> Result<bool, RateLimitError> {
            Err(RateLimitError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = InMemoryRateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.allow("scan:a", 3, 60).await.expect("allow"));
        }
        assert!(!limiter.allow("scan:a", 3, 60).await.expect("allow"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        assert!(limiter.allow("scan:a", 1, 60).await.expect("allow"));
        assert!(!limiter.allow("scan:a", 1, 60).await.expect("allow"));
        assert!(limiter.allow("scan:b", 1, 60).await.expect("allow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_expiry() {
        let limiter = InMemoryRateLimiter::new();
        assert!(limiter.allow("scan:a", 1, 60).await.expect("allow"));
        assert!(!limiter.allow("scan:a", 1, 60).await.expect("allow"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.allow("scan:a", 1, 60).await.expect("allow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let limiter = InMemoryRateLimiter::new();
        limiter.allow("scan:a", 1, 10).await.expect("allow");
        limiter.allow("scan:b", 1, 100).await.expect("allow");

        tokio::time::advance(Duration::from_secs(11)).await;
        limiter.purge_expired().await;
        assert_eq!(limiter.windows.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fails_open() {
        assert!(check_rate_limit(&BrokenLimiter, "scan:a", 1, 60).await);
    }

    #[tokio::test]
    async fn test_check_denies_over_limit() {
        let limiter = InMemoryRateLimiter::new();
        assert!(check_rate_limit(&limiter, "scan:a", 1, 60).await);
        assert!(!check_rate_limit(&limiter, "scan:a", 1, 60).await);
    }
}
