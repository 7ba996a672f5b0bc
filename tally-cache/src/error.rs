//! Error types for tally-cache

use std::string::FromUtf8Error;
use thiserror::Error;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache error types
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation was attempted before `Cache::initialize`
    #[error("Cache not initialized")]
    NotInitialized,

    /// The value cannot be represented by the cache
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// Stored bytes are not valid UTF-8
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Stored value does not parse as a base-10 integer
    #[error("Value at {key} is not an integer: {value:?}")]
    NotAnInteger { key: String, value: String },

    /// Caller-supplied decoder failed
    #[error("Decoder error: {0}")]
    Decoder(Box<dyn std::error::Error + Send + Sync>),

    /// Server returned an error
    #[error("Server error: {0}")]
    Server(String),

    /// Backing store rejected the operation
    #[error("Store error: {0}")]
    Store(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// True when the error means the store was unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() || err.is_connection_dropped() {
            Self::Connection(err.to_string())
        } else {
            Self::Store(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(CacheError::NotInitialized.to_string(), "Cache not initialized");
        assert_eq!(
            CacheError::Connection("refused".to_string()).to_string(),
            "Connection error: refused"
        );
        let err = CacheError::NotAnInteger {
            key: "k".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Value at k is not an integer: \"abc\"");
    }

    #[test]
    fn test_is_connection() {
        assert!(CacheError::Connection("down".to_string()).is_connection());
        assert!(!CacheError::NotInitialized.is_connection());
        assert!(!CacheError::Store("WRONGTYPE".to_string()).is_connection());
    }

    #[test]
    fn test_utf8_error_conversion() {
        let err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let cache_err: CacheError = err.into();
        assert!(matches!(cache_err, CacheError::Utf8(_)));
    }
}
