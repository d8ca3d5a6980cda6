//! Error types for the demo.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{service} request failed with status {status}: {body}")]
    Remote {
        service: String,
        status: u16,
        body: String,
    },
}

impl Error {
    /// Response body of a failed remote call, if there was one.
    pub fn response_details(&self) -> Option<&str> {
        match self {
            Error::Remote { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::Encoding(err.to_string())
    }
}
