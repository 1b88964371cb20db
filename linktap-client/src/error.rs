//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service reported `result: "error"`
    #[error("LinkTap error: {0}")]
    Api(String),

    /// Service reported a result code other than `ok` / `error`
    #[error("Unexpected result code: {0}")]
    UnexpectedResult(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
