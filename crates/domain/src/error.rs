//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or URL building.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more required parameters were absent or blank.
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingRequiredParameters(Vec<String>),

    /// A URI template placeholder had no matching path parameter.
    #[error("missing path parameter: {0}")]
    MissingPathParameter(String),

    /// Refresh options were missing required keys or carried unknown keys.
    #[error("invalid refresh options: {0}")]
    InvalidRefreshOptions(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
