//! Application layer for the LMS API client.
//!
//! Hosts the [`Client`] and everything it composes: the proxy
//! dispatcher, parameter validation, URL building, link-header
//! pagination, and the auth-refresh coordinator. All I/O goes through
//! the ports, so the layer stays testable with stub adapters.

mod client;
mod dispatch;
mod error;
mod oauth;
mod paginate;
pub mod ports;
mod url;
mod validate;

pub use client::Client;
pub use dispatch::{HelperAction, PageMode, ProxyOutput};
pub use error::{ClientError, ClientResult};
pub use url::build_url;
pub use validate::missing_required;
