//! SEOLens Core - Foundation crate for the SEOLens page scanner.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other SEOLens crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Scan pipeline values (`SignalSet`, `Issue`, `ScanResult`, `TargetUrl`)
//!
//! # Example
//!
//! ```rust
//! use seolens_core::{AppConfig, TargetUrl};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.fetch.max_attempts, 3);
//!
//! let target = TargetUrl::parse("https://example.com/pricing")?;
//! assert_eq!(target.host(), "example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, FallbackConfig, FetchSettings, RateLimitConfig, ScanConfig, ServerConfig,
};
pub use error::{ConfigError, ConfigResult, Result, SeolensError};
pub use types::{
    Assessment, ImageRef, Issue, IssueKind, Priority, ScanResult, SignalSet, Suggestion,
    TargetUrl,
};
