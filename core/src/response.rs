//! Outcome of a Drone API call.
//!
//! # Design
//! A successful JSON response is decoded to text and then re-encoded as a
//! JSON string, so `ApiResponse::Json` carries a quoted, escaped string
//! literal rather than the raw document. Existing callers depend on that
//! exact shape. [`ApiResponse::decode`] unwraps both layers for callers that
//! want typed data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Content type prefix that marks a response body as JSON.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status code and raw body of a response with status 300 or above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("HTTP {status}: {message}")]
pub struct Failure {
    pub status: u16,
    pub message: String,
}

/// Result of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    /// Success with a non-JSON body, returned verbatim.
    Text(String),
    /// Success with a JSON body, re-encoded as a JSON string literal.
    Json(String),
    /// Status 300 or above.
    Failure(Failure),
}

impl ApiResponse {
    /// Interpret a raw response. Never fails on status codes.
    pub fn from_http(response: HttpResponse) -> Result<Self, ApiError> {
        if response.status >= 300 {
            return Ok(ApiResponse::Failure(Failure {
                status: response.status,
                message: response.body,
            }));
        }
        let is_json = response
            .header("content-type")
            .is_some_and(|ct| ct.starts_with(JSON_CONTENT_TYPE));
        if is_json {
            let encoded = serde_json::to_string(&response.body).map_err(ApiError::Serialization)?;
            Ok(ApiResponse::Json(encoded))
        } else {
            Ok(ApiResponse::Text(response.body))
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ApiResponse::Failure(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ApiResponse::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// The success content as returned to callers, or the failure record.
    pub fn into_result(self) -> Result<String, Failure> {
        match self {
            ApiResponse::Text(content) | ApiResponse::Json(content) => Ok(content),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }

    /// Deserialize the success payload into `T`.
    ///
    /// For `Json` the string layer is removed first. A `Failure` decodes its
    /// message, which lets callers read Drone's `{"message": ...}` bodies.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let document = match self {
            ApiResponse::Json(encoded) => {
                serde_json::from_str::<String>(encoded).map_err(ApiError::Deserialization)?
            }
            ApiResponse::Text(text) => text.clone(),
            ApiResponse::Failure(failure) => failure.message.clone(),
        };
        serde_json::from_str(&document).map_err(ApiError::Deserialization)
    }
}
