//! Search-index fallback used when a target refuses direct fetches.

use crate::error::FallbackError;
use crate::extractor::count_words;
use async_trait::async_trait;
use reqwest::Client;
use seolens_core::{FallbackConfig, SignalSet};
use serde_json::Value;
use std::time::Duration;

/// Answers a search query with an opaque JSON payload.
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Run `query` against the search index.
    ///
    /// # Errors
    /// Returns `FallbackError` if the request fails or the provider answers
    /// with a non-success status.
    async fn search(&self, query: &str) -> Result<Value, FallbackError>;

    /// Short identifier used in logs.
    fn provider_id(&self) -> &str;
}

/// SerpAPI-backed [`FallbackProvider`].
#[derive(Debug, Clone)]
pub struct SerpApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiProvider {
    /// Create a provider for `api_key` against `base_url`.
    ///
    /// # Errors
    /// Returns `FallbackError::Request` if the HTTP client cannot be created.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FallbackError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Build a provider from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    ///
    /// # Errors
    /// Returns `FallbackError::Request` if the HTTP client cannot be created.
    pub fn from_config(config: &FallbackConfig) -> Result<Option<Self>, FallbackError> {
        match config.api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => Self::new(
                key,
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FallbackProvider for SerpApiProvider {
    async fn search(&self, query: &str) -> Result<Value, FallbackError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("engine", "google"),
                ("q", query),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }

    fn provider_id(&self) -> &str {
        "serpapi"
    }
}

/// Signals derived from the first organic search result.
///
/// The title doubles as the H1 and the snippet as the meta description.
/// Returns `None` when the payload has no organic result.
pub fn substitute_signals(payload: &Value) -> Option<SignalSet> {
    let first = payload.get("organic_results")?.as_array()?.first()?;

    let field = |name: &str| first.get(name).and_then(Value::as_str).map(str::to_string);
    let title = field("title");
    let snippet = field("snippet");

    Some(SignalSet {
        h1: title.clone(),
        title,
        word_count: snippet.as_deref().map_or(0, count_words),
        meta_description: snippet,
        h2s: Vec::new(),
        images: Vec::new(),
        http_status: 200,
    })
}
