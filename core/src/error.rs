//! Error types for the Drone API client.
//!
//! # Design
//! Only local and transport-level faults are errors. A response with a
//! status of 300 or above is not an error here: it comes back as
//! `ApiResponse::Failure` so the caller decides how to interpret it.

use thiserror::Error;

/// Errors returned by `DroneClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured server address could not be joined with the request path.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// DNS, connection, TLS, timeout or body-read failure in the transport.
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A response payload could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }
}
