//! Client error types

use thiserror::Error;

use lms_domain::DomainError;

use crate::ports::{AuthStoreError, TransportError};

/// Errors surfaced by the client.
///
/// Every failure is synchronous with the call that caused it; the only
/// retry the client performs on its own is the single refresh-triggered
/// replay of an expired-token request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The action name is not in the endpoint registry.
    #[error("unknown API action: {0}")]
    UnknownAction(String),

    /// The upstream API answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    InvalidApiRequest {
        /// Upstream HTTP status.
        status: u16,
        /// Upstream response body.
        body: String,
    },

    /// An upstream failure enriched by the dispatcher with the resolved
    /// request context. This is what `proxy` callers actually observe.
    #[error(
        "API request failed with status {status}: {body}\n\
         request url: {url}\nrequest action: {action}\n\
         request params: {params}\nrequest payload: {payload:?}"
    )]
    ApiRequestFailed {
        /// The symbolic action that was dispatched.
        action: String,
        /// The resolved request URL.
        url: String,
        /// Upstream HTTP status.
        status: u16,
        /// Upstream response body.
        body: String,
        /// The caller's parameters, serialized for diagnostics.
        params: String,
        /// The caller's payload, serialized for diagnostics.
        payload: Option<String>,
    },

    /// The OAuth refresh-token exchange itself failed.
    #[error("token refresh failed with status {status}: {body}")]
    RefreshTokenFailed {
        /// OAuth endpoint HTTP status.
        status: u16,
        /// OAuth endpoint response body.
        body: String,
    },

    /// The transport could not complete the request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The authentication store failed.
    #[error("auth store error: {0}")]
    Store(#[from] AuthStoreError),

    /// A body could not be parsed or serialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A query string or form body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encoding(String),

    /// The upstream body had an unexpected shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
