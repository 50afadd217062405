//! Authentication snapshot and refresh configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The client's in-memory authentication snapshot.
///
/// Either an opaque bearer token, or a view of an externally persisted
/// record identified by `id`. The snapshot is replaced wholesale on
/// refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Authentication {
    /// A bare bearer token with no backing record.
    Token {
        /// The bearer token.
        token: String,
    },
    /// A snapshot of an externally owned authentication record.
    Record {
        /// Identifier of the backing record in the auth store.
        id: String,
        /// The bearer token at snapshot time.
        token: String,
    },
}

impl Authentication {
    /// Creates a bare token snapshot.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    /// Creates a record-backed snapshot.
    #[must_use]
    pub fn record(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Record {
            id: id.into(),
            token: token.into(),
        }
    }

    /// Returns the current bearer token.
    #[must_use]
    pub fn bearer_token(&self) -> &str {
        match self {
            Self::Token { token } | Self::Record { token, .. } => token,
        }
    }

    /// Returns the backing record id, if any.
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::Token { .. } => None,
            Self::Record { id, .. } => Some(id),
        }
    }

    /// Returns a new snapshot with `token`, preserving the record id.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        match self {
            Self::Token { .. } => Self::token(token),
            Self::Record { id, .. } => Self::record(id.clone(), token),
        }
    }
}

/// Configuration for the OAuth refresh-token exchange.
///
/// Refresh is opt-in; a client without this configuration surfaces
/// expired-token failures directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with the OAuth application.
    pub redirect_uri: String,
    /// Long-lived refresh token to exchange.
    pub refresh_token: String,
}

const REQUIRED_OPTIONS: [&str; 4] = ["client_id", "client_secret", "redirect_uri", "refresh_token"];

impl RefreshConfig {
    /// Creates a refresh configuration from its parts.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Builds a configuration from a loosely typed options map, as
    /// handed over by application config files.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidRefreshOptions`] naming any unknown
    /// keys, or any required keys that are absent.
    pub fn from_options(options: &BTreeMap<String, String>) -> DomainResult<Self> {
        let extra: Vec<&str> = options
            .keys()
            .map(String::as_str)
            .filter(|key| !REQUIRED_OPTIONS.contains(key))
            .collect();
        if !extra.is_empty() {
            return Err(DomainError::InvalidRefreshOptions(format!(
                "invalid option(s) provided: {}",
                extra.join(", ")
            )));
        }

        let missing: Vec<&str> = REQUIRED_OPTIONS
            .iter()
            .copied()
            .filter(|key| !options.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::InvalidRefreshOptions(format!(
                "missing required option(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self::new(
            &options["client_id"],
            &options["client_secret"],
            &options["redirect_uri"],
            &options["refresh_token"],
        ))
    }
}
