//! Error types for riptide operations.
//!
//! Every failure in the fusion core is non-recoverable locally: there is no
//! retry loop and no partial-degradation fallback. Errors carry a distinct
//! variant per failure class so callers can decide whether to retry the whole
//! search or relax their configuration.

use thiserror::Error;

use crate::types::Channel;

/// Result type alias for riptide operations.
pub type RiptideResult<T> = Result<T, RiptideError>;

/// Main error type for all riptide operations.
#[derive(Error, Debug)]
pub enum RiptideError {
    /// A retrieval channel's underlying query failed. The pipeline aborts;
    /// no partial hybrid result is returned.
    #[error("{channel} channel query failed: {message}")]
    ChannelQuery {
        channel: Channel,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Fusion constants or weights are invalid. Raised before any I/O.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A request-level parameter is malformed. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The reranking call failed. Surfaced distinctly so callers can retry
    /// without reranking; the pipeline never falls back to the unreranked
    /// order on its own.
    #[error("Reranker error: {message}")]
    Reranker {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RiptideError {
    /// Create a channel query error.
    pub fn channel_query(channel: Channel, message: impl Into<String>) -> Self {
        Self::ChannelQuery {
            channel,
            message: message.into(),
            source: None,
        }
    }

    /// Create a channel query error wrapping an underlying failure.
    pub fn channel_query_with_source(
        channel: Channel,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ChannelQuery {
            channel,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a reranker error.
    pub fn reranker(message: impl Into<String>) -> Self {
        Self::Reranker {
            message: message.into(),
            source: None,
        }
    }

    /// Create a reranker error wrapping an underlying failure.
    pub fn reranker_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Reranker {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error was raised by validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::InvalidArgument(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_query_error_names_channel() {
        let err = RiptideError::channel_query(Channel::Vector, "connection reset");
        assert!(err.to_string().contains("vector"));
        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_errors_flagged() {
        assert!(RiptideError::invalid_configuration("k must be positive").is_validation());
        assert!(RiptideError::invalid_argument("limit must be positive").is_validation());
        assert!(!RiptideError::reranker("timeout").is_validation());
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = RiptideError::reranker_with_source("request failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
