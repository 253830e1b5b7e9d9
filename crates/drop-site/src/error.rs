//! Error types for the storefront.

use drop_chain::ChainError;
use drop_content::ContentError;
use drop_mint::MintError;
use thiserror::Error;

/// Result type for storefront operations.
pub type SiteResult<T> = Result<T, SiteError>;

/// Errors that can occur while serving the storefront.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Collection content could not be loaded.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// A mint workflow operation failed.
    #[error("Mint error: {0}")]
    Mint(#[from] MintError),

    /// A wallet or contract call failed outside a workflow.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed HTTP request.
    #[error("HTTP protocol error: {0}")]
    HttpError(String),

    /// Request head or body exceeds the size limit.
    #[error("Request too large: {0}")]
    TooLarge(String),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: SiteError = ContentError::Unavailable("down".to_string()).into();
        assert!(matches!(err, SiteError::Content(_)));

        let err: SiteError = MintError::AlreadyMinting.into();
        assert_eq!(err.to_string(), "Mint error: A mint is already in progress");

        let err: SiteError = ChainError::WalletUnavailable.into();
        assert!(matches!(err, SiteError::Chain(_)));
    }
}
