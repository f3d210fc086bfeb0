//! Error types for the master API client.

use thiserror::Error;

/// Errors raised while talking to the master.
///
/// Endpoints are recorded without their query string so tokens never appear
/// in error messages.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MasterApiError {
    /// Raised when the HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    /// Raised when the request never produced a response.
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// Path of the endpoint that was called.
        endpoint: String,
        /// Description of the connection failure.
        message: String,
    },
    /// Raised when the master answered with an unexpected status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        /// Path of the endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Error message reported by the master, or the raw body.
        message: String,
    },
    /// Raised when a successful response cannot be decoded.
    #[error("unexpected response from {endpoint}: {message}")]
    MalformedResponse {
        /// Path of the endpoint that was called.
        endpoint: String,
        /// Decoding failure.
        message: String,
    },
}
