//! Endpoint specification types
//!
//! An [`Endpoint`] is one entry of the generated endpoint registry: a
//! symbolic action name, an HTTP method, a URI template, and the ordered
//! parameter specifications scraped from the upstream API documentation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// HTTP methods supported by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request (single page or paginated).
    Get,
    /// POST request with a JSON payload.
    Post,
    /// PUT request with a JSON payload.
    Put,
    /// DELETE request without a payload.
    Delete,
}

impl HttpMethod {
    /// Returns the method as an uppercase wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declared parameter appears in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    /// Substituted into the URI template by name.
    Path,
    /// Allowed in the query string.
    Query,
    /// Sent in the request body; never part of the URL.
    Form,
}

/// Specification of a single endpoint parameter.
///
/// Names may encode one level of nesting as `parent[child]`, matching
/// the upstream API documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name, possibly nested as `parent[child]`.
    pub name: String,
    /// Whether the parameter must be present and non-blank.
    pub required: bool,
    /// Where the parameter appears.
    pub location: ParamLocation,
}

impl ParamSpec {
    /// Creates an optional path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            location: ParamLocation::Path,
        }
    }

    /// Creates an optional query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            location: ParamLocation::Query,
        }
    }

    /// Creates an optional form parameter.
    #[must_use]
    pub fn form(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            location: ParamLocation::Form,
        }
    }

    /// Marks this parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A parsed URI template with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriTemplate {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Segment {
    Literal(String),
    Param(String),
}

impl UriTemplate {
    /// Parses a template string such as `courses/{course_id}/assignments`.
    ///
    /// An unterminated `{` is kept as a literal rather than rejected; the
    /// registry is generated, so malformed templates indicate a generator
    /// bug that shows up immediately in rendered URLs.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            if let Some(close) = rest[open..].find('}').map(|i| open + i) {
                if open > 0 {
                    segments.push(Segment::Literal(rest[..open].to_string()));
                }
                segments.push(Segment::Param(rest[open + 1..close].to_string()));
                rest = &rest[close + 1..];
            } else {
                break;
            }
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Self { segments }
    }

    /// Renders the template, substituting every placeholder by name.
    ///
    /// A template without placeholders renders from its literals alone,
    /// regardless of `args`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingPathParameter`] if a placeholder has
    /// no value in `args`.
    pub fn render(&self, args: &BTreeMap<String, String>) -> DomainResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(name) => {
                    let value = args
                        .get(name)
                        .ok_or_else(|| DomainError::MissingPathParameter(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Returns the placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// One immutable entry of the endpoint registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Symbolic action name; unique within a registry.
    pub action: String,
    /// HTTP verb to dispatch with.
    pub method: HttpMethod,
    /// URI template relative to the API prefix.
    pub template: UriTemplate,
    /// Ordered parameter specifications.
    pub parameters: Vec<ParamSpec>,
}

impl Endpoint {
    /// Creates an endpoint with no parameters.
    #[must_use]
    pub fn new(action: impl Into<String>, method: HttpMethod, template: &str) -> Self {
        Self {
            action: action.into(),
            method,
            template: UriTemplate::parse(template),
            parameters: Vec::new(),
        }
    }

    /// Appends a parameter specification.
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Returns the declared path parameters.
    pub fn path_parameters(&self) -> impl Iterator<Item = &ParamSpec> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
    }

    /// Returns the declared query parameters.
    pub fn query_parameters(&self) -> impl Iterator<Item = &ParamSpec> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
    }

    /// Returns the required parameters.
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParamSpec> {
        self.parameters.iter().filter(|p| p.required)
    }
}
