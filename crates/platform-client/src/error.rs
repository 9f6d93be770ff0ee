use console_interface::{FetchError, QueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<ClientError> for FetchError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Status { status, .. } => FetchError::HttpStatus { status },
            ClientError::Deserialize(err) => FetchError::decode(err),
            ClientError::Http(err) => FetchError::transport(err),
            ClientError::InvalidUrl(err) => FetchError::transport(err),
        }
    }
}

impl From<ClientError> for QueryError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Status { status, message } => QueryError::Service { status, message },
            ClientError::Deserialize(err) => QueryError::decode(err),
            ClientError::Http(err) => QueryError::transport(err),
            ClientError::InvalidUrl(err) => QueryError::transport(err),
        }
    }
}
