//! SEOLens Scanner - The page-scan pipeline.
//!
//! A scan fetches one URL, extracts its on-page SEO signals, scores them
//! against a fixed rule table and records the outcome.
//!
//! # Features
//!
//! - Bounded retry with a fixed backoff when the target answers 429
//! - Search-index fallback when the target answers 403
//! - Cancellation of every request, backoff sleep and fallback call
//! - Lenient HTML extraction that never fails
//! - Deterministic scoring with positionally paired issues and suggestions
//!
//! # Example
//!
//! ```rust,ignore
//! use seolens_scanner::{PageFetcher, ReqwestTransport, RetryPolicy, ScanCoordinator, ScanRequest};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let transport = Arc::new(ReqwestTransport::new(&config.fetch)?);
//! let fetcher = Arc::new(PageFetcher::new(transport, None, RetryPolicy::from(&config.fetch)));
//! let coordinator = ScanCoordinator::new(fetcher, Arc::new(database));
//!
//! let outcome = coordinator
//!     .scan(
//!         &ScanRequest {
//!             owner_id: "user-1".to_string(),
//!             url: "https://example.com".to_string(),
//!             site_id: None,
//!         },
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{} scored {}", outcome.audit.url, outcome.result.score);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod coordinator;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
pub mod fallback;
pub mod fetcher;
pub mod scoring;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use coordinator::{ScanCoordinator, ScanOutcome, ScanRequest};
pub use error::{FallbackError, FetchError, Result, ScanError};
pub use extractor::{count_words, extract};
pub use fallback::{substitute_signals, FallbackProvider, SerpApiProvider};
pub use fetcher::{FetchSource, FetchedPage, PageFetcher, RetryPolicy};
pub use scoring::score;
pub use store::ScanStore;
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
