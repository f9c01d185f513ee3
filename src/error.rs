use isahc::{Error as IError, http::StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Isahc Error: {0}")]
    Isahc(#[from] IError),
    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("reporter answered with status {0:?}")]
    ReporterStatus(String),
    #[error("{0}")]
    IOError(#[from] std::io::Error),
}

/// Failure of a single bounded fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request blocked: {0}")]
    Blocked(#[source] IError),
    #[error("invalid request: {0}")]
    Request(#[source] IError),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),
}
