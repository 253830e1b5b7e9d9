//! Wallet sessions.
//!
//! A [`WalletSession`] holds at most one connected address. The storefront
//! only ever needs to connect, disconnect and read the current address.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ChainError, ChainResult};
use crate::rpc::JsonRpcClient;
use crate::types::Address;

/// A connection to a browser-style wallet provider.
#[async_trait::async_trait]
pub trait WalletSession: Send + Sync {
    /// Requests account access and records the first account.
    async fn connect(&self) -> ChainResult<Address>;

    /// Forgets the connected account.
    async fn disconnect(&self) -> ChainResult<()>;

    /// Currently connected address, if any.
    async fn current_address(&self) -> Option<Address>;
}

/// Wallet backed by a JSON-RPC provider answering `eth_requestAccounts`.
#[derive(Debug)]
pub struct RpcWallet {
    rpc: Arc<JsonRpcClient>,
    address: RwLock<Option<Address>>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        Self {
            rpc,
            address: RwLock::new(None),
        }
    }
}

#[async_trait::async_trait]
impl WalletSession for RpcWallet {
    async fn connect(&self) -> ChainResult<Address> {
        let accounts = self
            .rpc
            .call("eth_requestAccounts", json!([]))
            .await
            .map_err(ChainError::into_wallet_error)?;
        let address = first_account(&accounts)?;

        *self.address.write().await = Some(address);
        info!(address = %address, "wallet connected");
        Ok(address)
    }

    async fn disconnect(&self) -> ChainResult<()> {
        if let Some(address) = self.address.write().await.take() {
            info!(address = %address, "wallet disconnected");
        }
        Ok(())
    }

    async fn current_address(&self) -> Option<Address> {
        *self.address.read().await
    }
}

/// First address in an `eth_requestAccounts` result.
pub fn first_account(accounts: &Value) -> ChainResult<Address> {
    let first = accounts
        .as_array()
        .ok_or_else(|| ChainError::InvalidResponse("accounts is not an array".into()))?
        .first()
        .ok_or(ChainError::NoAccounts)?;
    first
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse("account is not a string".into()))?
        .parse()
}

/// Wallet used when no provider is configured; connecting always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedWallet;

#[async_trait::async_trait]
impl WalletSession for DetachedWallet {
    async fn connect(&self) -> ChainResult<Address> {
        debug!("connect requested without a wallet provider");
        Err(ChainError::WalletUnavailable)
    }

    async fn disconnect(&self) -> ChainResult<()> {
        Ok(())
    }

    async fn current_address(&self) -> Option<Address> {
        None
    }
}

/// In-memory wallet for tests and local development.
#[derive(Debug)]
pub struct MockWallet {
    account: Address,
    connected: RwLock<Option<Address>>,
    fail_connect: AtomicBool,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl MockWallet {
    /// Creates a disconnected wallet that will connect as `account`.
    pub fn new(account: Address) -> Self {
        Self {
            account,
            connected: RwLock::new(None),
            fail_connect: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Creates a wallet that is already connected as `account`.
    pub fn connected(account: Address) -> Self {
        Self {
            connected: RwLock::new(Some(account)),
            ..Self::new(account)
        }
    }

    /// Makes following connects fail as if the user rejected them.
    pub fn set_reject_connect(&self, reject: bool) {
        self.fail_connect.store(reject, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WalletSession for MockWallet {
    async fn connect(&self) -> ChainResult<Address> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(ChainError::UserRejected);
        }
        *self.connected.write().await = Some(self.account);
        Ok(self.account)
    }

    async fn disconnect(&self) -> ChainResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.connected.write().await = None;
        Ok(())
    }

    async fn current_address(&self) -> Option<Address> {
        *self.connected.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    #[test]
    fn test_first_account() {
        let accounts = json!(["0x70997970c51812dc3a010c7d01b50e0d17dc79c8"]);
        assert_eq!(first_account(&accounts).unwrap(), account());

        assert!(matches!(first_account(&json!([])), Err(ChainError::NoAccounts)));
        assert!(matches!(
            first_account(&json!("0x00")),
            Err(ChainError::InvalidResponse(_))
        ));
        assert!(matches!(
            first_account(&json!(["nope"])),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_wallet_connect_disconnect() {
        let wallet = MockWallet::new(account());
        assert!(wallet.current_address().await.is_none());

        assert_eq!(wallet.connect().await.unwrap(), account());
        assert_eq!(wallet.current_address().await, Some(account()));

        wallet.disconnect().await.unwrap();
        assert!(wallet.current_address().await.is_none());
        assert_eq!(wallet.connect_count(), 1);
        assert_eq!(wallet.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_wallet_rejects() {
        let wallet = MockWallet::new(account());
        wallet.set_reject_connect(true);
        assert!(matches!(wallet.connect().await, Err(ChainError::UserRejected)));
        assert!(wallet.current_address().await.is_none());
    }

    #[tokio::test]
    async fn test_mock_wallet_starts_connected() {
        let wallet = MockWallet::connected(account());
        assert_eq!(wallet.current_address().await, Some(account()));
    }

    #[tokio::test]
    async fn test_detached_wallet() {
        let wallet = DetachedWallet;
        assert!(matches!(wallet.connect().await, Err(ChainError::WalletUnavailable)));
        assert!(wallet.disconnect().await.is_ok());
        assert!(wallet.current_address().await.is_none());
    }
}
