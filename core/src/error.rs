//! Error types for the Holodex API client.
//!
//! # Design
//! Validation failures (`UnsupportedFilter`, `MissingRequiredField`,
//! `IncompatibleFilterCombination`) are raised before a request exists, so
//! nothing reaches the network. `Status` and `Transport` are the two shapes of
//! a transport failure; both carry the endpoint, and the encoded URL when it
//! is known, so a log line is enough to reproduce the call. The API key never
//! appears in either.

use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::filter::Field;

/// Errors returned by `HolodexClient` build, parse and send methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path id of `.` or `..`, which URL normalization would drop and so
    /// address a different resource.
    #[error("{endpoint}: `{field}` value {value:?} cannot be used as a path segment")]
    InvalidPathSegment {
        endpoint: Endpoint,
        field: Field,
        value: String,
    },

    /// A filter was supplied that the endpoint does not accept.
    #[error("{endpoint}: filter `{field}` is not supported by this endpoint")]
    UnsupportedFilter { endpoint: Endpoint, field: Field },

    /// A filter the endpoint requires was absent or empty.
    #[error("{endpoint}: required filter `{field}` is missing")]
    MissingRequiredField { endpoint: Endpoint, field: Field },

    /// Filters that are fine on their own but not together.
    #[error("{endpoint}: {reason}")]
    IncompatibleFilterCombination {
        endpoint: Endpoint,
        reason: &'static str,
    },

    /// The response body did not match the expected shape.
    #[error("{endpoint}: malformed response: {source}")]
    MalformedResponse {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured base URL cannot carry path segments.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The server answered with a non-2xx status. `url` is known when the
    /// request went through a `Transport`.
    #[error("{endpoint}: HTTP {status}: {body}")]
    Status {
        endpoint: Endpoint,
        url: Option<String>,
        status: u16,
        body: String,
    },

    /// The transport could not complete the round-trip.
    #[error("{endpoint}: transport failed for {url}: {source}")]
    Transport {
        endpoint: Endpoint,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApiError {
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::Transport { .. })
    }

    /// True for errors raised before any request was built.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            ApiError::UnsupportedFilter { .. }
                | ApiError::MissingRequiredField { .. }
                | ApiError::IncompatibleFilterCombination { .. }
                | ApiError::InvalidPathSegment { .. }
        )
    }

    /// HTTP status of a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
