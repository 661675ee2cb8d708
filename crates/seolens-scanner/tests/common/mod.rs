//! Test doubles shared by the scanner integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use seolens_scanner::{FallbackError, FallbackProvider, FetchError, HttpTransport, RawResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Transport that replays a fixed script of responses.
///
/// When the script runs out, the last entry repeats.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, FetchError>>>,
    last: Mutex<Option<RawResponse>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    pub fn statuses(statuses: &[u16]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|&status| Ok(RawResponse::new(status, format!("status {status}"))))
                .collect(),
        )
    }

    pub fn html(body: &str) -> Self {
        Self::new(vec![Ok(RawResponse::new(200, body))])
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, _url: &str) -> Result<RawResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Ok(response)) => {
                *self.last.lock().expect("last lock") = Some(response.clone());
                Ok(response)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self
                .last
                .lock()
                .expect("last lock")
                .clone()
                .expect("script must not be empty")),
        }
    }
}

/// Transport whose requests never complete.
pub struct HangingTransport;

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn get(&self, _url: &str) -> Result<RawResponse, FetchError> {
        std::future::pending().await
    }
}

/// Fallback provider answering every query with the same payload.
pub struct StaticFallback {
    payload: Option<Value>,
    queries: Mutex<Vec<String>>,
}

impl StaticFallback {
    pub fn answering(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl FallbackProvider for StaticFallback {
    async fn search(&self, query: &str) -> Result<Value, FallbackError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_string());
        self.payload.clone().ok_or(FallbackError::Status(502))
    }

    fn provider_id(&self) -> &str {
        "static"
    }
}

/// Fallback provider whose searches never complete.
pub struct HangingFallback;

#[async_trait]
impl FallbackProvider for HangingFallback {
    async fn search(&self, _query: &str) -> Result<Value, FallbackError> {
        std::future::pending().await
    }

    fn provider_id(&self) -> &str {
        "hanging"
    }
}
