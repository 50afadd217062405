//! In-memory authentication store.
//!
//! Backs the `AuthStore` port with a process-local map, one async mutex
//! per record. Suitable for single-process deployments and tests; a
//! database-backed store would hold a row lock where this holds a mutex.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lms_application::ports::{AuthRecord, AuthStore, AuthStoreError, RefreshFn};
use lms_application::ClientError;

/// A process-local, lock-per-record authentication store.
#[derive(Default)]
pub struct InMemoryAuthStore {
    records: RwLock<HashMap<String, Arc<Mutex<String>>>>,
}

impl InMemoryAuthStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, id: impl Into<String>, token: impl Into<String>) {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.into(), Arc::new(Mutex::new(token.into())));
    }

    /// Returns the currently persisted token for `id`, if any.
    pub async fn token(&self, id: &str) -> Option<String> {
        let cell = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned()?;
        let token = cell.lock().await;
        Some(token.clone())
    }

    fn cell(&self, id: &str) -> Result<Arc<Mutex<String>>, ClientError> {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| AuthStoreError::NotFound(id.to_string()).into())
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn refresh_under_lock(
        &self,
        id: &str,
        decide: RefreshFn,
    ) -> Result<AuthRecord, ClientError> {
        let cell = self.cell(id)?;
        // Held across the decision so concurrent refreshers serialize
        // and the second one sees the first one's write.
        let mut token = cell.lock().await;
        let record = AuthRecord {
            id: id.to_string(),
            token: token.clone(),
        };
        match decide(record.clone()).await? {
            Some(fresh) => {
                tracing::debug!(id, "persisting refreshed token");
                *token = fresh.clone();
                Ok(AuthRecord {
                    id: record.id,
                    token: fresh,
                })
            }
            None => Ok(record),
        }
    }
}
