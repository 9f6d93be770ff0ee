use thiserror::Error;

/// Boxed cause kept for diagnostics without tying this crate to a transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while fetching the status document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("status request failed: {0}")]
    Transport(#[source] BoxError),
    #[error("status endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("status response could not be parsed: {0}")]
    Decode(#[source] BoxError),
}

impl FetchError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }
}

/// Failure while executing an ad-hoc query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no data returned")]
    NoData,
    #[error("a query is already running")]
    InFlight,
    #[error("query service is not configured")]
    Unconfigured,
    #[error("query request failed: {0}")]
    Transport(#[source] BoxError),
    #[error("query service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },
    #[error("query response could not be parsed: {0}")]
    Decode(#[source] BoxError),
}

impl QueryError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }

    /// Sentence shown next to the query input.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::NoData => "No data returned from query".to_string(),
            other => format!("Failed to execute query: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn fetch_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = FetchError::transport(io);

        assert_eq!(err.to_string(), "status request failed: refused");
        assert!(err.source().is_some());
    }

    #[test]
    fn query_error_messages() {
        assert_eq!(QueryError::NoData.to_string(), "no data returned");
        assert_eq!(
            QueryError::NoData.user_message(),
            "No data returned from query"
        );

        let err = QueryError::Service {
            status: 400,
            message: "PARSE_ERROR".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Failed to execute query: query service returned HTTP 400: PARSE_ERROR"
        );
    }
}
