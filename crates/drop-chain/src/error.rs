//! Error types for wallet and contract operations.

use thiserror::Error;

/// EIP-1193 error code for a request the user rejected in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors that can occur while talking to the wallet or the drop contract.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Address is not 20 bytes of `0x`-prefixed hex.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transaction hash is not 32 bytes of `0x`-prefixed hex.
    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),

    /// The node or wallet returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The HTTP request could not be sent or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was well-formed JSON with an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Contract return data could not be decoded.
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// No wallet provider is configured.
    #[error("No wallet provider available")]
    WalletUnavailable,

    /// The wallet returned no accounts.
    #[error("Wallet has no accounts")]
    NoAccounts,

    /// The user rejected the request in the wallet.
    #[error("Request rejected by user")]
    UserRejected,

    /// The contract call failed or the contract is unreachable.
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// The transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    /// The transaction receipt did not show up in time.
    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),

    /// A value does not fit the target integer type.
    #[error("Numeric overflow: {0}")]
    Overflow(String),
}

impl ChainError {
    /// Maps RPC errors with the EIP-1193 rejection code to [`ChainError::UserRejected`].
    pub fn into_wallet_error(self) -> Self {
        match self {
            ChainError::Rpc { code, .. } if code == USER_REJECTED_CODE => ChainError::UserRejected,
            other => other,
        }
    }
}

/// Result type for wallet and contract operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::Rpc {
            code: -32000,
            message: "execution reverted: !Qty".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32000: execution reverted: !Qty");
        assert_eq!(ChainError::WalletUnavailable.to_string(), "No wallet provider available");
    }

    #[test]
    fn test_into_wallet_error() {
        let err = ChainError::Rpc {
            code: USER_REJECTED_CODE,
            message: "User denied".to_string(),
        };
        assert!(matches!(err.into_wallet_error(), ChainError::UserRejected));

        let err = ChainError::Rpc {
            code: -32603,
            message: "internal".to_string(),
        };
        assert!(matches!(err.into_wallet_error(), ChainError::Rpc { code: -32603, .. }));
    }
}
