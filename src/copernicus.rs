//! Copernicus Data Space Ecosystem: OData product catalogue, Keycloak identity service and
//! product content download locations.
mod catalogue;
mod identity;
mod provider;
mod query;

pub use catalogue::{parse_search_response, CatalogueRecord, SearchResponse};
pub use identity::{BearerToken, Credentials};
pub use provider::{Endpoints, Provider, CATALOGUE_API, IDENTITY_API, PUBLIC_CLIENT_ID};
pub use query::{CatalogueQuery, PAGE_SIZE};
