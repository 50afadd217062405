//! Link-header pagination
//!
//! Walks `rel="next"` cursors embedded in response headers, either
//! streaming each page to a callback or collecting every page into one
//! sequence. Cursors arrive as absolute URLs and are followed verbatim.

use serde_json::Value;

use lms_domain::{next_page_url, HttpMethod};

use crate::client::Client;
use crate::error::{ClientError, ClientResult};

impl Client {
    /// Streams a paginated GET, handing each page's parsed body to
    /// `on_page` until no `rel="next"` cursor remains.
    ///
    /// # Errors
    ///
    /// Propagates request failures; a missing or malformed `link` header
    /// is the terminal state, not an error.
    pub async fn api_get_paged(
        &self,
        api_url: &str,
        on_page: &mut (dyn FnMut(Value) + Send),
    ) -> ClientResult<()> {
        let connector = if api_url.contains('?') { '&' } else { '?' };
        let mut next_url = format!("{api_url}{connector}per_page={}", self.per_page());
        let mut pages = 0_u32;
        loop {
            let response = self.request(HttpMethod::Get, &next_url, None).await?;
            on_page(response.json()?);
            pages += 1;
            match response.headers.get("link").and_then(next_page_url) {
                Some(following) => next_url = following,
                None => {
                    tracing::debug!(pages, url = %api_url, "pagination walk complete");
                    return Ok(());
                }
            }
        }
    }

    /// Collects a paginated GET into one sequence, preserving page order.
    ///
    /// # Errors
    ///
    /// As [`Client::api_get_paged`]; additionally
    /// [`ClientError::UnexpectedResponse`] if any page body is not a
    /// JSON array.
    pub async fn api_get_all(&self, api_url: &str) -> ClientResult<Vec<Value>> {
        let mut pages = Vec::new();
        self.api_get_paged(api_url, &mut |page| pages.push(page)).await?;

        let mut all = Vec::new();
        for page in pages {
            match page {
                Value::Array(items) => all.extend(items),
                other => {
                    return Err(ClientError::UnexpectedResponse(format!(
                        "expected a page array, got: {other}"
                    )));
                }
            }
        }
        Ok(all)
    }
}
