//! Endpoint registry
//!
//! A read-only mapping from symbolic action names to endpoint
//! specifications, produced by the offline documentation generator and
//! supplied at client construction.

use std::collections::{HashMap, HashSet};

use crate::endpoint::Endpoint;

/// Actions whose required parameters are conditional on a discriminator
/// field the static specs cannot express (e.g. external tools configured
/// `by_xml` need none of the usual credentials). Validation is skipped
/// for these.
const DEFAULT_VALIDATION_EXEMPT: [&str; 2] = [
    "CREATE_EXTERNAL_TOOL_COURSES",
    "CREATE_EXTERNAL_TOOL_ACCOUNTS",
];

/// The endpoint registry. Immutable once handed to a client.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: HashMap<String, Endpoint>,
    validation_exempt: HashSet<String>,
}

impl Registry {
    /// Creates an empty registry with the default validation exemptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: HashMap::new(),
            validation_exempt: DEFAULT_VALIDATION_EXEMPT
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Inserts an endpoint, keyed by its action name. Action names are
    /// unique; a duplicate replaces the earlier entry.
    pub fn insert(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.action.clone(), endpoint);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.insert(endpoint);
        self
    }

    /// Marks an action as exempt from required-parameter validation.
    pub fn exempt_from_validation(&mut self, action: impl Into<String>) {
        self.validation_exempt.insert(action.into());
    }

    /// Looks up an endpoint by action name.
    #[must_use]
    pub fn get(&self, action: &str) -> Option<&Endpoint> {
        self.endpoints.get(action)
    }

    /// Returns true if validation is skipped for `action`.
    #[must_use]
    pub fn is_validation_exempt(&self, action: &str) -> bool {
        self.validation_exempt.contains(action)
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no endpoints are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl FromIterator<Endpoint> for Registry {
    fn from_iter<T: IntoIterator<Item = Endpoint>>(iter: T) -> Self {
        let mut registry = Self::new();
        for endpoint in iter {
            registry.insert(endpoint);
        }
        registry
    }
}
