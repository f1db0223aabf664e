use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build or send the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The API request returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No market data could be retrieved for any of the {requested} requested symbols")]
    NoData { requested: usize },
}
