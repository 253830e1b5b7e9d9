//! Error types for the mint workflow.

use drop_chain::ChainError;
use thiserror::Error;

/// Errors returned by [`MintWorkflow`](crate::workflow::MintWorkflow).
#[derive(Debug, Error)]
pub enum MintError {
    /// A wallet or contract call failed.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// The view was torn down before the operation finished.
    #[error("Workflow cancelled")]
    Cancelled,

    /// The mint control is disabled.
    #[error("Mint not allowed: {0}")]
    NotAllowed(String),

    /// A mint is already in flight.
    #[error("A mint is already in progress")]
    AlreadyMinting,

    /// No contract has been attached yet.
    #[error("No drop contract attached")]
    NoContract,
}

/// Result type for mint workflow operations.
pub type MintResult<T> = Result<T, MintError>;
