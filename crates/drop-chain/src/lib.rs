//! # drop-chain
//!
//! Wallet sessions and NFT drop contracts over Ethereum JSON-RPC.
//!
//! ## Overview
//!
//! - [`WalletSession`]: connect, disconnect and read the connected address.
//!   [`RpcWallet`] talks to a provider endpoint, [`DetachedWallet`] stands
//!   in when none is configured.
//! - [`DropContract`]: claimed tokens, total supply, claim conditions,
//!   claiming and token metadata. [`RpcDropContract`] implements it against
//!   a deployed ERC-721 drop.
//! - [`ContractConnector`]: resolves a collection's contract address to a
//!   [`DropContract`] handle.
//!
//! In-memory implementations ([`MockWallet`], [`MockDropContract`],
//! [`MockConnector`]) are part of the public API for tests and local runs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use drop_chain::{
//!     Address, ContractConnector, JsonRpcClient, RpcConfig, RpcConnector, RpcWallet,
//!     WalletSession,
//! };
//!
//! async fn example() -> drop_chain::ChainResult<()> {
//!     let rpc = Arc::new(JsonRpcClient::new(RpcConfig::new("http://127.0.0.1:8545"))?);
//!     let wallet = RpcWallet::new(rpc.clone());
//!     let me = wallet.connect().await?;
//!     println!("You're logged in with wallet {}", me.short());
//!
//!     let address: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse()?;
//!     let contract = RpcConnector::new(rpc).connect(&address)?;
//!     let claimed = contract.claimed_tokens().await?.len();
//!     let total = contract.total_supply().await?;
//!     println!("{} / {} claimed", claimed, total);
//!
//!     let results = contract.claim_to(&me, 1).await?;
//!     for result in &results {
//!         let metadata = result.metadata(contract.as_ref()).await?;
//!         println!("minted {:?}", metadata.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod abi;
pub mod contract;
pub mod drop_erc721;
pub mod error;
pub mod rpc;
pub mod types;
pub mod wallet;

pub use contract::{ContractConnector, DropContract, MockConnector, MockDropContract};
pub use drop_erc721::{RpcConnector, RpcDropContract};
pub use error::{ChainError, ChainResult};
pub use rpc::{JsonRpcClient, RpcConfig};
pub use types::{
    format_units, Address, ClaimConditions, ClaimResult, CurrencyValue, LogEntry, NftMetadata,
    TokenId, TransactionReceipt, TxHash,
};
pub use wallet::{DetachedWallet, MockWallet, RpcWallet, WalletSession};
