//! The LMS API client and its auth-refresh coordinator
//!
//! One [`Client`] per logical API session, long-lived across many calls.
//! Every network call goes through [`Client::request`], which classifies
//! the upstream status and transparently refreshes an expired bearer
//! token (at most once per call) before replaying the request.

use std::sync::Arc;

use tokio::sync::RwLock;

use lms_domain::{ApiRequest, ApiResponse, Authentication, HttpMethod, RefreshConfig, Registry};

use crate::error::{ClientError, ClientResult};
use crate::oauth;
use crate::ports::{AuthStore, HttpTransport};

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = "LMS-API Rust";

/// Prefix for regular API paths under the base URI.
const API_PREFIX: &str = "api/v1";

/// The challenge the upstream API attaches to an expired-token 401.
/// Any other 401 is an ordinary failure, not a refresh trigger.
const TOKEN_EXPIRED_CHALLENGE: &str = "Bearer realm=\"canvas-lms\"";

/// Default number of records requested per page.
const DEFAULT_PER_PAGE: u32 = 100;

/// Classification of one upstream response.
enum Outcome {
    /// 200/201, return the body.
    Success,
    /// 401 with the expired-token challenge; internal signal only,
    /// always handled by the coordinator.
    RefreshNeeded,
    /// Any other status.
    Failed,
}

/// A client for one LMS API session.
pub struct Client {
    base_uri: String,
    per_page: u32,
    registry: Arc<Registry>,
    transport: Arc<dyn HttpTransport>,
    authentication: RwLock<Authentication>,
    refresh: Option<RefreshConfig>,
    auth_store: Option<Arc<dyn AuthStore>>,
    max_refreshes_per_call: u32,
}

impl Client {
    /// Creates a client.
    ///
    /// `base_uri` is the institution's root URI; API paths are resolved
    /// beneath `<base_uri>/api/v1/`. Refresh is opt-in via
    /// [`Client::with_refresh`].
    #[must_use]
    pub fn new(
        base_uri: impl Into<String>,
        authentication: Authentication,
        registry: Arc<Registry>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut base_uri = base_uri.into();
        while base_uri.ends_with('/') {
            base_uri.pop();
        }
        Self {
            base_uri,
            per_page: DEFAULT_PER_PAGE,
            registry,
            transport,
            authentication: RwLock::new(authentication),
            refresh: None,
            auth_store: None,
            max_refreshes_per_call: 1,
        }
    }

    /// Enables refresh-on-expiry with the given OAuth configuration.
    #[must_use]
    pub fn with_refresh(mut self, config: RefreshConfig) -> Self {
        self.refresh = Some(config);
        self
    }

    /// Attaches the store coordinating a shared authentication record.
    ///
    /// Without a store, a record-backed client falls back to a direct
    /// exchange, with no cross-holder deduplication.
    #[must_use]
    pub fn with_auth_store(mut self, store: Arc<dyn AuthStore>) -> Self {
        self.auth_store = Some(store);
        self
    }

    /// Overrides the page size used by pagination.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Returns the current authentication snapshot.
    pub async fn authentication(&self) -> Authentication {
        self.authentication.read().await.clone()
    }

    /// Returns the endpoint registry this client dispatches against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Resolves `api_url` against the base URI.
    ///
    /// Absolute `http…` URLs pass through verbatim; pagination cursors
    /// arrive fully qualified from the `link` header.
    #[must_use]
    pub fn full_url(&self, api_url: &str, use_api_prefix: bool) -> String {
        if api_url.starts_with("http") {
            api_url.to_string()
        } else if use_api_prefix {
            format!("{}/{API_PREFIX}/{api_url}", self.base_uri)
        } else {
            format!("{}/{api_url}", self.base_uri)
        }
    }

    /// Issues a GET request for a single page.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn api_get(&self, api_url: &str) -> ClientResult<ApiResponse> {
        self.request(HttpMethod::Get, api_url, None).await
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn api_post(&self, api_url: &str, body: &str) -> ClientResult<ApiResponse> {
        self.request(HttpMethod::Post, api_url, Some(body)).await
    }

    /// Issues a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn api_put(&self, api_url: &str, body: &str) -> ClientResult<ApiResponse> {
        self.request(HttpMethod::Put, api_url, Some(body)).await
    }

    /// Issues a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn api_delete(&self, api_url: &str) -> ClientResult<ApiResponse> {
        self.request(HttpMethod::Delete, api_url, None).await
    }

    /// Issues one upstream call with refresh-on-expiry semantics.
    ///
    /// The call is attempted with the current bearer token. A 401
    /// carrying the expected challenge triggers the refresh path and a
    /// replay; at most [`max_refreshes_per_call`](Self) refreshes are
    /// spent on one call, after which the 401 surfaces as
    /// [`ClientError::InvalidApiRequest`].
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidApiRequest`] for non-success statuses,
    /// [`ClientError::RefreshTokenFailed`] when the exchange fails, and
    /// transport or store errors from the ports.
    pub(crate) async fn request(
        &self,
        method: HttpMethod,
        api_url: &str,
        body: Option<&str>,
    ) -> ClientResult<ApiResponse> {
        let url = self.full_url(api_url, true);
        let mut refreshes = 0;
        loop {
            let token = self.authentication.read().await.bearer_token().to_string();
            let mut request = ApiRequest::new(method, url.clone())
                .with_header("Authorization", format!("Bearer {token}"))
                .with_header("User-Agent", USER_AGENT);
            if let Some(body) = body {
                request = request
                    .with_header("Content-Type", "application/json")
                    .with_body(body);
            }

            let response = self.transport.execute(&request).await?;
            match Self::classify(&response) {
                Outcome::Success => return Ok(response),
                Outcome::RefreshNeeded => {
                    let Some(config) = &self.refresh else {
                        // Refresh is opt-in; without a config the 401 is final.
                        return Err(Self::invalid_api_request(&response));
                    };
                    if refreshes >= self.max_refreshes_per_call {
                        tracing::warn!(url = %url, "token still rejected after refresh");
                        return Err(Self::invalid_api_request(&response));
                    }
                    refreshes += 1;
                    tracing::debug!(url = %url, "expired token challenge received, refreshing");
                    self.refresh_authentication(config).await?;
                }
                Outcome::Failed => return Err(Self::invalid_api_request(&response)),
            }
        }
    }

    fn classify(response: &ApiResponse) -> Outcome {
        if response.status.is_ok_or_created() {
            return Outcome::Success;
        }
        if response.status.as_u16() == 401
            && response.headers.get("www-authenticate") == Some(TOKEN_EXPIRED_CHALLENGE)
        {
            return Outcome::RefreshNeeded;
        }
        Outcome::Failed
    }

    fn invalid_api_request(response: &ApiResponse) -> ClientError {
        ClientError::InvalidApiRequest {
            status: response.status.as_u16(),
            body: response.body.clone(),
        }
    }

    /// Obtains a fresh bearer token and replaces the snapshot.
    ///
    /// For a record-backed snapshot with an attached store, the decision
    /// runs under the store's exclusive lock: exchange only if the
    /// persisted token still equals the one the failing call used,
    /// otherwise adopt the token another holder already refreshed.
    async fn refresh_authentication(&self, config: &RefreshConfig) -> ClientResult<()> {
        let snapshot = self.authentication.read().await.clone();
        let replaced = match (snapshot.record_id(), &self.auth_store) {
            (Some(id), Some(store)) => {
                let stale = snapshot.bearer_token().to_string();
                let transport = Arc::clone(&self.transport);
                let base_uri = self.base_uri.clone();
                let config = config.clone();
                let record = store
                    .refresh_under_lock(
                        id,
                        Box::new(move |record| {
                            Box::pin(async move {
                                if record.token == stale {
                                    let token = oauth::exchange_refresh_token(
                                        transport.as_ref(),
                                        &base_uri,
                                        &config,
                                        &record.token,
                                    )
                                    .await?;
                                    Ok(Some(token))
                                } else {
                                    tracing::debug!(
                                        id = %record.id,
                                        "adopting token already refreshed by another holder"
                                    );
                                    Ok(None)
                                }
                            })
                        }),
                    )
                    .await?;
                Authentication::record(record.id, record.token)
            }
            _ => {
                let token = oauth::exchange_refresh_token(
                    self.transport.as_ref(),
                    &self.base_uri,
                    config,
                    snapshot.bearer_token(),
                )
                .await?;
                snapshot.with_token(token)
            }
        };
        *self.authentication.write().await = replaced;
        Ok(())
    }
}
