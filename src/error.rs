// this_file: src/error.rs
//! Error types for the luxmeter library

use thiserror::Error;

/// Main error type for luxmeter operations
#[derive(Debug, Error)]
pub enum Error {
    /// Upload or remote payload has a content type outside the allow list
    #[error("Unsupported image type: {0}")]
    UnsupportedMediaType(String),

    /// Payload exceeds the configured byte cap
    #[error("Image exceeds maximum allowed size: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    /// Zero-length upload or download
    #[error("Empty image file")]
    EmptyPayload,

    /// Bytes that do not decode as a supported image
    #[error("Invalid or corrupted image file: {0}")]
    InvalidImage(String),

    /// Unknown metric name in the request
    #[error("Invalid metrics requested: {0}")]
    InvalidMetric(String),

    /// Unknown edge mode in the request
    #[error("Invalid edge_mode requested: {0}")]
    InvalidEdgeMode(String),

    /// Malformed URL or disallowed scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL host falls into a blocked network range
    #[error("Disallowed URL host: {0}")]
    DisallowedHost(String),

    /// Remote fetch exceeded the configured timeout
    #[error("Request timeout while downloading image from {0}")]
    FetchTimeout(String),

    /// Remote server answered with a non-success status
    #[error("Failed to download image: upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Connection-level failure while fetching
    #[error("Failed to download image: {0}")]
    FetchFailed(String),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parsing error
    #[error("Config error: {0}")]
    Config(String),

    /// Unexpected failure during decode or computation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for luxmeter operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error is attributable to the client request rather than
    /// the service itself.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::Config(_) | Error::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_size_details() {
        let err = Error::PayloadTooLarge {
            size: 6_000_000,
            max: 5_242_880,
        };
        let msg = err.to_string();
        assert!(msg.contains("6000000"));
        assert!(msg.contains("5242880"));
    }

    #[test]
    fn client_error_classification() {
        assert!(Error::EmptyPayload.is_client_error());
        assert!(Error::UpstreamStatus(503).is_client_error());
        assert!(!Error::Internal("decode panicked".into()).is_client_error());
    }
}
