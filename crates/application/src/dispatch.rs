//! The proxy dispatcher
//!
//! The single entry point generated calling code goes through: resolve
//! a symbolic action through the registry, validate parameters, build
//! the URL, and dispatch by verb. Helper actions run composite logic
//! that is not a 1:1 API call.

use serde_json::Value;

use lms_domain::{DomainError, Endpoint, HttpMethod, Params, Payload};

use crate::client::Client;
use crate::error::{ClientError, ClientResult};
use crate::ports::BoxFuture;
use crate::{url, validate};

/// How a GET dispatch consumes multi-page results.
pub enum PageMode<'a> {
    /// One request, one parsed body.
    Single,
    /// Walk all pages and return the concatenated sequence.
    CollectAll,
    /// Walk all pages, handing each parsed page to the callback.
    Stream(&'a mut (dyn FnMut(Value) + Send)),
}

/// Result of a [`Client::proxy`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutput {
    /// The parsed response body of a single request, or a helper's
    /// synthetic result.
    Body(Value),
    /// The concatenated pages of a collect-all GET.
    Pages(Vec<Value>),
    /// Pages were delivered through the streaming callback.
    Streamed,
}

impl ProxyOutput {
    /// Returns the single body, if that is what was produced.
    #[must_use]
    pub fn into_body(self) -> Option<Value> {
        match self {
            Self::Body(value) => Some(value),
            Self::Pages(_) | Self::Streamed => None,
        }
    }

    /// Returns the collected pages, if that is what was produced.
    #[must_use]
    pub fn into_pages(self) -> Option<Vec<Value>> {
        match self {
            Self::Pages(items) => Some(items),
            Self::Body(_) | Self::Streamed => None,
        }
    }
}

/// Composite actions implemented over several API calls rather than a
/// registry entry. A closed set: adding a helper means adding a variant
/// and its composite method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperAction {
    /// Every account, including recursively fetched sub-accounts.
    AllAccounts,
}

impl HelperAction {
    /// Resolves a helper from its symbolic action name.
    #[must_use]
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "HELPER_ALL_ACCOUNTS" => Some(Self::AllAccounts),
            _ => None,
        }
    }
}

impl Client {
    /// Dispatches `action` with the given parameters and payload.
    ///
    /// Helper actions run their composite logic with no validation and
    /// return a synthetic body. For registry actions the flow is:
    /// validate, build the URL, dispatch by verb. GET honors `mode`;
    /// POST/PUT send the payload as JSON (raw strings verbatim,
    /// structured maps serialized); DELETE sends no payload.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnknownAction`] for unregistered actions,
    /// [`DomainError::MissingRequiredParameters`] from validation, and
    /// [`ClientError::ApiRequestFailed`], the enriched form of any
    /// upstream failure, carrying the resolved URL, params and payload.
    pub async fn proxy(
        &self,
        action: &str,
        params: Params,
        payload: Option<Payload>,
        mode: PageMode<'_>,
    ) -> ClientResult<ProxyOutput> {
        if let Some(helper) = HelperAction::from_action(action) {
            let result = match helper {
                HelperAction::AllAccounts => self.all_accounts().await?,
            };
            return Ok(ProxyOutput::Body(Value::Array(result)));
        }

        let endpoint = self
            .registry()
            .get(action)
            .ok_or_else(|| ClientError::UnknownAction(action.to_string()))?
            .clone();

        // Raw payloads are parsed once so validation can see into them;
        // the wire still gets the caller's bytes.
        let parsed_payload = match &payload {
            Some(Payload::Raw(body)) => Some(Payload::Structured(serde_json::from_str(body)?)),
            Some(structured @ Payload::Structured(_)) => Some(structured.clone()),
            None => None,
        };

        if !self.registry().is_validation_exempt(action) {
            let missing = validate::missing_required(&endpoint, &params, parsed_payload.as_ref());
            if !missing.is_empty() {
                return Err(DomainError::MissingRequiredParameters(missing).into());
            }
        }

        let request_url = url::build_url(&endpoint, &params)?;
        tracing::debug!(action, url = %request_url, method = %endpoint.method, "dispatching");

        self.dispatch(&endpoint, &request_url, payload.as_ref(), mode)
            .await
            .map_err(|error| enrich(error, action, &request_url, &params, payload.as_ref()))
    }

    async fn dispatch(
        &self,
        endpoint: &Endpoint,
        request_url: &str,
        payload: Option<&Payload>,
        mode: PageMode<'_>,
    ) -> ClientResult<ProxyOutput> {
        match endpoint.method {
            HttpMethod::Get => match mode {
                PageMode::Stream(on_page) => {
                    self.api_get_paged(request_url, on_page).await?;
                    Ok(ProxyOutput::Streamed)
                }
                PageMode::CollectAll => Ok(ProxyOutput::Pages(self.api_get_all(request_url).await?)),
                PageMode::Single => {
                    let response = self.api_get(request_url).await?;
                    Ok(ProxyOutput::Body(response.json()?))
                }
            },
            HttpMethod::Post => {
                let body = serialize_payload(payload)?;
                let response = self.api_post(request_url, &body).await?;
                Ok(ProxyOutput::Body(response.json()?))
            }
            HttpMethod::Put => {
                let body = serialize_payload(payload)?;
                let response = self.api_put(request_url, &body).await?;
                Ok(ProxyOutput::Body(response.json()?))
            }
            HttpMethod::Delete => {
                let response = self.api_delete(request_url).await?;
                Ok(ProxyOutput::Body(response.json()?))
            }
        }
    }

    /// Boxed collect-all dispatch; helpers re-enter `proxy`, so the
    /// recursive future has to be type-erased.
    fn collect_all<'a>(
        &'a self,
        action: &'a str,
        params: Params,
    ) -> BoxFuture<'a, ClientResult<Vec<Value>>> {
        Box::pin(async move {
            self.proxy(action, params, None, PageMode::CollectAll)
                .await?
                .into_pages()
                .ok_or_else(|| {
                    ClientError::UnexpectedResponse(format!("{action} did not collect pages"))
                })
        })
    }

    /// `HELPER_ALL_ACCOUNTS`: every visible account followed by its
    /// recursively listed sub-accounts, as one flat sequence.
    async fn all_accounts(&self) -> ClientResult<Vec<Value>> {
        let accounts = self.collect_all("LIST_ACCOUNTS", Params::new()).await?;

        let mut all = Vec::new();
        for account in accounts {
            let params = Params::new()
                .with("account_id", account["id"].clone())
                .with("recursive", true);
            let sub_accounts = self
                .collect_all("GET_SUB_ACCOUNTS_OF_ACCOUNT", params)
                .await?;
            all.push(account);
            all.extend(sub_accounts);
        }
        Ok(all)
    }
}

fn serialize_payload(payload: Option<&Payload>) -> ClientResult<String> {
    payload.map_or_else(|| Ok("{}".to_string()), |p| Ok(p.to_body()?))
}

/// Rewraps an upstream failure with the resolved request context so
/// callers can reconstruct the failing call, without pushing any of
/// this into the coordinator.
fn enrich(
    error: ClientError,
    action: &str,
    request_url: &str,
    params: &Params,
    payload: Option<&Payload>,
) -> ClientError {
    match error {
        ClientError::InvalidApiRequest { status, body } => ClientError::ApiRequestFailed {
            action: action.to_string(),
            url: request_url.to_string(),
            status,
            body,
            params: serde_json::to_string(params).unwrap_or_default(),
            payload: payload.map(|p| p.to_body().unwrap_or_default()),
        },
        other => other,
    }
}
