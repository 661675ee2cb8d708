//! HTTP transport seam for the fetch orchestrator.
//!
//! The orchestrator only ever sees a status code and a body. Status codes are
//! never turned into errors here; that decision belongs to the caller.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use seolens_core::FetchSettings;

/// A status code and the decoded body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Build a response from parts.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a single GET request.
///
/// Implementations must be thread-safe and must report every status code,
/// including 4xx and 5xx, as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` once.
    ///
    /// # Errors
    /// Returns `FetchError::Timeout` or `FetchError::Transport` when no
    /// response was received.
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured user agent, timeout and an
    /// `Accept: text/html` default header.
    ///
    /// # Errors
    /// Returns `FetchError::Client` if the HTTP client cannot be created.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        tracing::trace!(url, status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}
