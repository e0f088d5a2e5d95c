use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Catalogue request failed: {0}")]
    Catalogue(String),

    #[error("No data found")]
    NoData,

    #[error("No tiles found for given period")]
    NoTiles,

    #[error("Keycloak token creation failed: {0}")]
    Authentication(String),

    #[error("Download of {identifier} failed: {source}")]
    Download {
        identifier: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Unable to follow redirect: {0}")]
    Redirect(String),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
