use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid booking time: {0}")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, Error>;
