//! LMS Domain - Core client types
//!
//! This crate defines the domain model for the LMS API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod link;
pub mod params;
pub mod registry;
pub mod request;
pub mod response;

pub use auth::{Authentication, RefreshConfig};
pub use endpoint::{Endpoint, HttpMethod, ParamLocation, ParamSpec, UriTemplate};
pub use error::{DomainError, DomainResult};
pub use link::next_page_url;
pub use params::{Params, Payload};
pub use registry::Registry;
pub use request::ApiRequest;
pub use response::{ApiResponse, Headers, StatusCode};
