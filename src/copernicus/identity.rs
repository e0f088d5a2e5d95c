use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;
use url::Url;

/// Operator credentials for the identity provider.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

/// Short-lived access token, presented as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Resource owner password grant against a Keycloak token endpoint.
pub async fn request_token(
    client: &Client,
    url: Url,
    client_id: &str,
    credentials: &Credentials,
) -> Result<BearerToken> {
    debug!(user = %credentials.name, "Requesting access token");
    let form = [
        ("client_id", client_id),
        ("username", credentials.name.as_str()),
        ("password", credentials.password.as_str()),
        ("grant_type", "password"),
    ];

    let response = client
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::Authentication(format!("request could not be completed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        // The body is only a hint; the status stays the reported cause
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<body unavailable: {e}>"),
        };
        return Err(Error::Authentication(format!(
            "server answered {status}. Response from the server was: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::Authentication(format!("malformed token response: {e}")))?;

    token
        .access_token
        .filter(|t| !t.is_empty())
        .map(BearerToken)
        .ok_or_else(|| {
            Error::Authentication("token response carries no access_token".to_string())
        })
}
