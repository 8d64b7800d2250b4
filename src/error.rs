//! Error taxonomy shared by the transport clients, the import workflow
//! and the store.
//!
//! Business validation failures (HTTP 400 with a well-formed payload) are
//! NOT errors here: the clients turn them into ordinary result values.
//! Everything in [`ApiError`] is a transport failure and must reach the
//! caller.

use thiserror::Error;

/// Message carried by an explicitly cancelled request.
pub const CANCELLED_MESSAGE: &str = "Request cancelled";

/// Transport-level failure talking to the catalogue API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status that the caller does not
    /// treat as a business outcome
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// 2xx response whose body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request could not be built (bad URL, unserializable body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status used for notification classification.
    ///
    /// Timeouts map to 408 like the browser client did; network and
    /// decoding failures carry no status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Timeout => Some(408),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_)
            | ApiError::MalformedResponse(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Cancelled => None,
        }
    }

    /// Machine-readable code, mirroring the codes the API client reported
    pub fn code(&self) -> &str {
        match self {
            ApiError::Timeout => "TIMEOUT",
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Status { code: Some(code), .. } => code,
            ApiError::Status { .. } => "HTTP_ERROR",
            ApiError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Cancelled => "CANCELLED",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Local failure turning a selected file into a structured document.
/// No network call is ever made after one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Please select a JSON file")]
    NotJson,

    #[error("Failed to read file")]
    Unreadable,

    #[error("Invalid JSON file")]
    InvalidJson,
}
