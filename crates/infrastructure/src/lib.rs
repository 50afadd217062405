//! LMS client infrastructure - adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: a reqwest-backed HTTP transport and an
//! in-memory authentication store.

pub mod adapters;
pub mod store;

pub use adapters::ReqwestTransport;
pub use store::InMemoryAuthStore;
