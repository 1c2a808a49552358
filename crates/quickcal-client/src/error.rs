//! Client error types.

use thiserror::Error;

use quickcal_auth::AuthError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a `quickcal` invocation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("request failed with {status}: {body}")]
    Request {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] quickcal_core::TracingError),
}
