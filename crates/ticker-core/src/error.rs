//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers every way a request to the
//! upstream API, the parsing of its response, or a watchlist operation can fail.
//! Each error maps onto an [`ErrorKind`] so callers that downgrade a failure to a
//! warning can still record what went wrong.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of an upstream advisory carried in an otherwise well-formed body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisoryKind {
    /// The API refused the call because the request frequency was too high.
    RateLimit,
    /// An informational message (premium endpoint, demo key, etc.).
    Information,
    /// An explicit `"Error Message"`, usually an unknown symbol or bad parameter.
    ErrorMessage,
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimit => "rate limit",
            Self::Information => "information",
            Self::ErrorMessage => "error message",
        };
        f.write_str(label)
    }
}

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network failure, non-2xx HTTP status, or a body that is not valid JSON.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body parsed but the API answered with an advisory instead of data.
    #[error("Upstream {kind}: {message}")]
    UpstreamAdvisory {
        /// What kind of advisory the API sent.
        kind: AdvisoryKind,
        /// The advisory text as sent by the API.
        message: String,
    },

    /// The response is missing the key that holds the requested resource.
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// A value inside an otherwise well-shaped response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error reading or writing the watchlist store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a [`DataError`], kept alongside non-fatal warnings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`DataError::Transport`].
    Transport,
    /// See [`DataError::UpstreamAdvisory`].
    UpstreamAdvisory,
    /// See [`DataError::Shape`] and [`DataError::Parse`].
    Shape,
    /// Everything else.
    Other,
}

impl DataError {
    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::UpstreamAdvisory { .. } => ErrorKind::UpstreamAdvisory,
            Self::Shape(_) | Self::Parse(_) => ErrorKind::Shape,
            Self::InvalidParameter(_) | Self::Storage(_) | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns true if the API asked us to slow down.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::UpstreamAdvisory {
                kind: AdvisoryKind::RateLimit,
                ..
            }
        )
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DataError::Transport("x".into()).kind(), ErrorKind::Transport);
        assert_eq!(DataError::Parse("x".into()).kind(), ErrorKind::Shape);
        assert_eq!(DataError::Shape("x".into()).kind(), ErrorKind::Shape);
        assert_eq!(DataError::Storage("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_advisory_display() {
        let err = DataError::UpstreamAdvisory {
            kind: AdvisoryKind::RateLimit,
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream rate limit: slow down");
        assert!(err.is_rate_limited());
        assert_eq!(err.kind(), ErrorKind::UpstreamAdvisory);
    }
}
