//! Catalog fetch error types.

use thiserror::Error;

/// Errors that can occur when fetching from the catalog.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Failed to send the request or read the response.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-success HTTP response.
    #[error("HTTP {status} for {url}")]
    HttpError { status: u16, url: String },

    /// The catalog has no such record.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: u64 },

    /// Request timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Failed to parse a response body or fixture.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Failed to read a fixture file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_decode() {
            FetchError::ParseError(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::HttpError {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}
