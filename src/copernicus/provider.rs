use super::catalogue::{self, CatalogueRecord};
use super::identity::{self, BearerToken, Credentials};
use super::query::CatalogueQuery;
use crate::error::{Error, Result};
use crate::http::{self, CatalogueOps, REQUEST_TIMEOUT};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const CATALOGUE_API: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1/Products";
pub const IDENTITY_API: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";
pub const PUBLIC_CLIENT_ID: &str = "cdse-public";

/// Service locations. Defaults point at the Copernicus Data Space production services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub catalogue: Url,
    pub identity: Url,
    pub client_id: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalogue: Url::parse(CATALOGUE_API).expect("Catalogue url should always parse"),
            identity: Url::parse(IDENTITY_API).expect("Identity url should always parse"),
            client_id: PUBLIC_CLIENT_ID.to_string(),
        }
    }
}

pub struct Provider {
    client: Client,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Provider whose search and token requests give up after [`REQUEST_TIMEOUT`].
    pub fn from_endpoints(endpoints: Endpoints) -> Result<Self> {
        let client = http::client_with_timeout(REQUEST_TIMEOUT)?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(self: &Self) -> &Endpoints {
        &self.endpoints
    }
}

impl CatalogueOps for Provider {
    async fn search(self: &Self, query: &CatalogueQuery) -> Result<Vec<CatalogueRecord>> {
        catalogue::search(&self.client, query.to_url(&self.endpoints.catalogue)).await
    }

    async fn get_token(self: &Self, credentials: &Credentials) -> Result<BearerToken> {
        identity::request_token(
            &self.client,
            self.endpoints.identity.clone(),
            &self.endpoints.client_id,
            credentials,
        )
        .await
    }

    fn product_url(self: &Self, id: &str) -> Result<Url> {
        let base = self.endpoints.catalogue.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}({id})/$value"))
            .map_err(|e| Error::Catalogue(format!("invalid product url for {id}: {e}")))
    }
}
