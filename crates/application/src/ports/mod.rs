//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and external
//! systems. Each port is a trait implemented by adapters in the
//! infrastructure layer (or by client applications for the auth store).

mod auth_store;
mod transport;

pub use auth_store::{AuthRecord, AuthStore, AuthStoreError, BoxFuture, RefreshDecision, RefreshFn};
pub use transport::{HttpTransport, TransportError};
