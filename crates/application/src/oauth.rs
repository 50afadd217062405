//! OAuth refresh-token exchange
//!
//! Trades the configured long-lived refresh token for a new bearer
//! token. This is the sub-operation of the refresh path, distinct from
//! the 401-retry loop in the client.

use serde::Deserialize;

use lms_domain::{ApiRequest, HttpMethod, RefreshConfig};

use crate::client::USER_AGENT;
use crate::error::{ClientError, ClientResult};
use crate::ports::HttpTransport;

/// Token endpoint path, relative to the base URI (no API prefix).
const TOKEN_PATH: &str = "login/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the refresh token for a new bearer token.
///
/// # Errors
///
/// Returns [`ClientError::RefreshTokenFailed`] for a non-success
/// response from the token endpoint, and transport or decode errors
/// otherwise.
pub(crate) async fn exchange_refresh_token(
    transport: &dyn HttpTransport,
    base_uri: &str,
    config: &RefreshConfig,
    bearer_token: &str,
) -> ClientResult<String> {
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("refresh_token", config.refresh_token.as_str()),
    ];
    let body = serde_urlencoded::to_string(form).map_err(|e| ClientError::Encoding(e.to_string()))?;

    let request = ApiRequest::new(HttpMethod::Post, format!("{base_uri}/{TOKEN_PATH}"))
        .with_header("Authorization", format!("Bearer {bearer_token}"))
        .with_header("User-Agent", USER_AGENT)
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(body);

    let response = transport.execute(&request).await?;
    if !response.status.is_ok_or_created() {
        return Err(ClientError::RefreshTokenFailed {
            status: response.status.as_u16(),
            body: response.body.clone(),
        });
    }

    let token: TokenResponse = serde_json::from_str(&response.body)?;
    tracing::debug!("refresh token exchange succeeded");
    Ok(token.access_token)
}
