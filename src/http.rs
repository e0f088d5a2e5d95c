//! Utility functions for creating http clients, and the operations a product catalogue offers
use crate::copernicus::{BearerToken, CatalogueQuery, CatalogueRecord, Credentials};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Bound for catalogue searches and token requests. Transfers are not bounded.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_REDIRECTS: usize = 10;

pub fn client_with_timeout(timeout: Duration) -> Result<Client> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

pub trait CatalogueOps {
    async fn search(self: &Self, query: &CatalogueQuery) -> Result<Vec<CatalogueRecord>>;

    async fn get_token(self: &Self, credentials: &Credentials) -> Result<BearerToken>;

    /// Location of the binary content of the product with the given id.
    fn product_url(self: &Self, id: &str) -> Result<Url>;
}

pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Authenticated connection context shared by every download of a run.
pub struct Session {
    manual: Client,
    following: Client,
}

impl Session {
    pub fn with_bearer(token: &BearerToken) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.secret()))
            .map_err(|e| Error::Authentication(format!("token is not a valid header value: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        let manual = Client::builder()
            .default_headers(headers.clone())
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let following = Client::builder()
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self { manual, following })
    }

    /// Walk the redirect chain starting at `url` and return the first location that does not
    /// redirect, together with the number of hops taken.
    pub async fn resolve(self: &Self, url: Url) -> Result<(Url, usize)> {
        let mut url = url;
        let mut hops = 0;

        loop {
            let response = self.manual.get(url.clone()).send().await?;
            if !is_redirect(response.status()) {
                return Ok((url, hops));
            }
            if hops == MAX_REDIRECTS {
                return Err(Error::Redirect(format!(
                    "more than {MAX_REDIRECTS} redirects starting from {url}"
                )));
            }

            let location = response
                .headers()
                .get(LOCATION)
                .ok_or_else(|| Error::Redirect(format!("{} without Location header", response.status())))?
                .to_str()
                .map_err(|e| Error::Redirect(format!("unreadable Location header: {e}")))?;

            // Location may be relative to the current url
            let next = url
                .join(location)
                .map_err(|e| Error::Redirect(format!("invalid Location {location}: {e}")))?;
            debug!(from = %url, to = %next, "Following redirect");

            url = next;
            hops += 1;
        }
    }

    /// Content request with redirects followed by the client.
    pub async fn fetch(self: &Self, url: Url) -> Result<Response> {
        let response = self.following.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}
