//! Error responses for the HTTP API.
//!
//! Every failure leaves the server as `{"error": ..., "details": ...}` with
//! `details` omitted when empty.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use seolens_db::DatabaseError;
use seolens_scanner::{FetchError, ScanError};
use serde::Serialize;

/// Seconds a client should wait before retrying a retryable failure.
const RETRY_AFTER_SECS: &str = "30";

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status of the response
    pub status: StatusCode,
    /// Short user-facing message
    pub message: String,
    /// Optional debugging context
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    /// Create an error without details.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Create an error with details.
    pub fn with_details(
        status: StatusCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// 400 for a malformed request.
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(StatusCode::BAD_REQUEST, "Invalid request data", details)
    }

    /// 401 for a request without an identity.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// 404 for a missing or foreign resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 429 for a caller over their own rate limit.
    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Try again later.",
        )
    }

    /// 500 for anything unexpected.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::with_details(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            details,
        )
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self.status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        let details = err.to_string();
        match err {
            ScanError::Validation(msg) => Self::bad_request(msg),
            ScanError::SiteNotFound { .. } => Self::not_found("Site not found or access denied"),
            ScanError::Fetch(FetchError::RetriesExhausted { .. }) => Self::with_details(
                StatusCode::SERVICE_UNAVAILABLE,
                "Target site is rate limiting requests",
                details,
            ),
            ScanError::Fetch(FetchError::Cancelled { .. }) | ScanError::DeadlineExceeded { .. } => {
                Self::with_details(StatusCode::GATEWAY_TIMEOUT, "Scan timed out", details)
            }
            ScanError::Fetch(_) => Self::with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to scan page",
                details,
            ),
            ScanError::Persistence(_) => Self::with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save scan results",
                details,
            ),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::from(DatabaseError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = %self.message,
                details = ?self.details,
                "Request failed"
            );
        } else {
            tracing::debug!(status = self.status.as_u16(), error = %self.message, "Request rejected");
        }

        let body = Json(ErrorBody {
            error: &self.message,
            details: self.details.as_deref(),
        });

        if self.is_retryable() {
            (self.status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_statuses() {
        let cases = [
            (ScanError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                ScanError::SiteNotFound {
                    site_id: "s".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ScanError::Fetch(FetchError::RetriesExhausted {
                    url: "u".to_string(),
                    attempts: 3,
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ScanError::Fetch(FetchError::Status {
                    url: "u".to_string(),
                    status: 500,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ScanError::DeadlineExceeded {
                    url: "u".to_string(),
                    seconds: 45,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ScanError::Fetch(FetchError::Cancelled {
                    url: "u".to_string(),
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ScanError::Persistence(DatabaseError::Decode("x".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_retry_after_on_retryable() {
        let response = ApiError::from(ScanError::DeadlineExceeded {
            url: "u".to_string(),
            seconds: 45,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(response.headers().contains_key(header::RETRY_AFTER));

        let response = ApiError::bad_request("nope").into_response();
        assert!(!response.headers().contains_key(header::RETRY_AFTER));
    }
}
