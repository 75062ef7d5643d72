use std::fmt;
use thiserror::Error;

/// Kind of failure encountered while fetching contributor metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentErrorKind {
    Connection,   // Network error - retry
    Timeout,      // Request timeout - retry
    RateLimited,  // Endpoint asked us to slow down - retry
    NotFound,     // Title unknown to the endpoint - NO retry
    Unauthorized, // Bad or missing credentials - NO retry
    Parse,        // Response parse error - retry
    Unknown,      // Unknown error - retry
}

impl EnrichmentErrorKind {
    /// Returns true if this error kind should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            EnrichmentErrorKind::NotFound | EnrichmentErrorKind::Unauthorized
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentErrorKind::Connection => "connection",
            EnrichmentErrorKind::Timeout => "timeout",
            EnrichmentErrorKind::RateLimited => "rate_limited",
            EnrichmentErrorKind::NotFound => "not_found",
            EnrichmentErrorKind::Unauthorized => "unauthorized",
            EnrichmentErrorKind::Parse => "parse",
            EnrichmentErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EnrichmentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind} error: {message}")]
pub struct EnrichmentError {
    pub kind: EnrichmentErrorKind,
    pub message: String,
}

impl EnrichmentError {
    pub fn new(kind: EnrichmentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Classifies a transport level failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            EnrichmentErrorKind::Timeout
        } else if err.is_connect() || err.is_request() {
            EnrichmentErrorKind::Connection
        } else if err.is_decode() {
            EnrichmentErrorKind::Parse
        } else {
            EnrichmentErrorKind::Unknown
        };
        Self::new(kind, err.to_string())
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        let kind = match status.as_u16() {
            404 => EnrichmentErrorKind::NotFound,
            401 | 403 => EnrichmentErrorKind::Unauthorized,
            429 => EnrichmentErrorKind::RateLimited,
            500..=599 => EnrichmentErrorKind::Connection,
            _ => EnrichmentErrorKind::Unknown,
        };
        Self::new(kind, format!("{} failed with status: {}", context, status))
    }
}
