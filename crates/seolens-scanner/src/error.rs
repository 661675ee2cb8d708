use seolens_db::DatabaseError;
use thiserror::Error;

/// Failures of the fetch orchestrator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("target still rate limited after {attempts} attempts: {url}")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("fetch failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("fallback unavailable for {url}: {reason}")]
    FallbackUnavailable { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Map a `reqwest` failure for `url` onto the fetch taxonomy.
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Failures of the search-index fallback provider.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("fallback credential not configured")]
    MissingCredential,

    #[error("fallback request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("fallback provider answered HTTP {0}")]
    Status(u16),
}

/// Failures of a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("site {site_id} not found or access denied")]
    SiteNotFound { site_id: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("scan of {url} exceeded its {seconds}s deadline")]
    DeadlineExceeded { url: String, seconds: u64 },
}

impl ScanError {
    /// Whether the caller may retry the same scan later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DeadlineExceeded { .. }
                | Self::Fetch(FetchError::RetriesExhausted { .. } | FetchError::Cancelled { .. })
        )
    }
}

impl From<seolens_core::SeolensError> for ScanError {
    fn from(err: seolens_core::SeolensError) -> Self {
        match err {
            seolens_core::SeolensError::Validation(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
