//! Authentication store port
//!
//! The authentication record is externally owned and possibly shared
//! across processes. The client never mutates it directly; it hands the
//! store a refresh decision to run while the store holds an exclusive
//! lock on the record. Reloading under the lock and comparing tokens
//! before exchanging is what keeps concurrent 401 holders from
//! refreshing the same record twice.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ClientError;

/// A loaded authentication record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    /// Record identifier.
    pub id: String,
    /// The bearer token currently persisted for this record.
    pub token: String,
}

/// Errors that can occur during auth store operations.
#[derive(Debug, Error)]
pub enum AuthStoreError {
    /// No record exists with the given id.
    #[error("authentication record not found: {0}")]
    NotFound(String),

    /// The backing storage failed.
    #[error("auth storage failure: {0}")]
    Backend(String),
}

/// Boxed future alias used by [`RefreshFn`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a refresh decision: `Some(token)` writes the new token to
/// the record before the lock is released; `None` keeps the record as
/// loaded (the caller adopts its token instead).
pub type RefreshDecision = Result<Option<String>, ClientError>;

/// A refresh decision to run while the record lock is held.
pub type RefreshFn = Box<dyn FnOnce(AuthRecord) -> BoxFuture<'static, RefreshDecision> + Send>;

/// Port for lock-guarded access to shared authentication records.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Acquires an exclusive lock on the record `id`, reloads it, runs
    /// `decide` with the loaded state, applies a returned token, and
    /// returns the record as it stands when the lock is released.
    ///
    /// The lock must be held for the whole load/decide/update sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AuthStoreError`] failures (as `ClientError::Store`) for
    /// missing records or backend faults, and propagates any error the
    /// decision itself produces.
    async fn refresh_under_lock(
        &self,
        id: &str,
        decide: RefreshFn,
    ) -> Result<AuthRecord, ClientError>;
}
