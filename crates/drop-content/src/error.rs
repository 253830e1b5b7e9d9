//! Error types for content API operations.

use thiserror::Error;

/// Errors that can occur while reading collections from the content API.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("Content API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body, if any.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A query result could not be decoded into the expected record type.
    #[error("Failed to decode query result: {0}")]
    Decode(#[from] serde_json::Error),

    /// Image reference is missing or not of the form `image-<id>-<WxH>-<fmt>`.
    #[error("Invalid image reference: {0}")]
    InvalidImageRef(String),

    /// Configuration is incomplete or inconsistent.
    #[error("Invalid content configuration: {0}")]
    InvalidConfig(String),

    /// Mock backend was told to fail.
    #[error("Content backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for content API operations.
pub type ContentResult<T> = Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContentError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Content API returned HTTP 401: Unauthorized");

        let err = ContentError::InvalidImageRef("file-abc".to_string());
        assert_eq!(err.to_string(), "Invalid image reference: file-abc");
    }
}
