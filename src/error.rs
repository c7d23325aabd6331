use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector could not be parsed. Selector: {0}")]
    ParseInvalidSelector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Url Error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Header Error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
