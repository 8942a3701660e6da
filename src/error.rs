//! Error types for sitewatch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(io) => Error::Io(io),
                other => Error::Format(format!("{other:?}")),
            }
        } else {
            Error::Format(e.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Format(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
