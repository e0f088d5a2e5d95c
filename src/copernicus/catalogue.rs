use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

/// One product row of an OData `Products` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogueRecord {
    pub id: String,
    pub name: String,
    /// GeoJSON geometry as delivered by the server
    #[serde(default, rename = "GeoFootprint")]
    pub footprint: Option<Value>,
    /// Everything else the server sent (`ContentDate`, `S3Path`, expanded `Attributes`, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub value: Vec<CatalogueRecord>,
    #[serde(rename = "@odata.count")]
    pub count: Option<u64>,
}

pub async fn search(client: &Client, url: Url) -> Result<Vec<CatalogueRecord>> {
    debug!(%url, "Querying catalogue");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Catalogue(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Catalogue(format!("unable to read response body: {e}")))?;

    if !status.is_success() {
        return Err(Error::Catalogue(format!(
            "server answered {status}: {body}"
        )));
    }

    parse_search_response(&body)
}

/// Records of a search response body. An empty result set is reported as [`Error::NoData`].
pub fn parse_search_response(body: &str) -> Result<Vec<CatalogueRecord>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| Error::Catalogue(format!("malformed response: {e}")))?;

    match response.count {
        Some(count) => info!("Catalogue returned {} of {count} products", response.value.len()),
        None => info!("Catalogue returned {} products", response.value.len()),
    }

    if response.value.is_empty() {
        return Err(Error::NoData);
    }
    Ok(response.value)
}
