//! Client error types

use thiserror::Error;

/// Errors returned by inventory and metrics clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, TLS...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the remote API
    #[error("error retrieving {caller} data: {status} - {message}")]
    Api {
        /// Which resource was being fetched
        caller: String,
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("error decoding {0}")]
    Decode(String),

    /// Well-formed response without the data asked for
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// Caller passed an argument the API cannot serve
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Request URL could not be built
    #[error("invalid URL: {0}")]
    Url(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
