//! Authentication store adapters.

mod memory;

pub use memory::InMemoryAuthStore;
