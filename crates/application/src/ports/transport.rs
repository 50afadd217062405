//! HTTP transport port

use async_trait::async_trait;
use thiserror::Error;

use lms_domain::{ApiRequest, ApiResponse};

/// Errors that can occur below the HTTP layer.
///
/// Upstream error *statuses* are not transport errors; they come back as
/// ordinary [`ApiResponse`] values and are classified by the client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out: {url}")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request URL was not parseable.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, keeping the
/// client core independent of specific HTTP libraries and trivially
/// stubbable in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes a request and returns the upstream response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was obtained at all;
    /// non-2xx responses are returned as values.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
