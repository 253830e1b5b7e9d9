//! Drop contract abstraction.
//!
//! [`DropContract`] is the handful of reads and the one write the mint
//! workflow needs. [`ContractConnector`] resolves an address to a contract
//! handle. In-memory implementations live here too.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::abi::{encode_u128, keccak256};
use crate::error::{ChainError, ChainResult};
use crate::types::{
    Address, ClaimConditions, ClaimResult, NftMetadata, TokenId, TransactionReceipt, TxHash,
};

/// An NFT drop contract.
#[async_trait::async_trait]
pub trait DropContract: Send + Sync {
    /// Address of the contract.
    fn address(&self) -> Address;

    /// Tokens claimed so far.
    async fn claimed_tokens(&self) -> ChainResult<Vec<TokenId>>;

    /// Number of tokens the drop will ever contain.
    async fn total_supply(&self) -> ChainResult<u128>;

    /// The active claim phase.
    async fn claim_conditions(&self) -> ChainResult<ClaimConditions>;

    /// Claims `quantity` tokens for `recipient`, waiting for the transaction.
    async fn claim_to(&self, recipient: &Address, quantity: u64) -> ChainResult<Vec<ClaimResult>>;

    /// Metadata document of a token.
    async fn token_metadata(&self, token_id: TokenId) -> ChainResult<NftMetadata>;
}

/// Resolves a contract address to a handle.
pub trait ContractConnector: Send + Sync {
    fn connect(&self, address: &Address) -> ChainResult<Arc<dyn DropContract>>;
}

#[derive(Debug)]
struct MockDropState {
    claimed: u128,
    total: u128,
    conditions: ClaimConditions,
    claims: Vec<(Address, TokenId)>,
}

/// In-memory drop contract.
///
/// Claims succeed until the supply is exhausted and advance the claimed
/// count. Reads and claims can be made to fail or slowed down.
#[derive(Debug)]
pub struct MockDropContract {
    address: Address,
    state: Mutex<MockDropState>,
    fail_reads: AtomicBool,
    fail_claims: AtomicBool,
    delay: Mutex<Option<Duration>>,
    reads: AtomicUsize,
    claim_calls: AtomicUsize,
}

impl MockDropContract {
    /// Creates a drop with nothing claimed, 100 tokens and a 0.01 ETH price.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Mutex::new(MockDropState {
                claimed: 0,
                total: 100,
                conditions: ClaimConditions::native(10_000_000_000_000_000),
                claims: Vec::new(),
            }),
            fail_reads: AtomicBool::new(false),
            fail_claims: AtomicBool::new(false),
            delay: Mutex::new(None),
            reads: AtomicUsize::new(0),
            claim_calls: AtomicUsize::new(0),
        }
    }

    /// Sets claimed and total supply.
    pub fn with_supply(mut self, claimed: u128, total: u128) -> Self {
        let state = self.state.get_mut();
        state.claimed = claimed;
        state.total = total;
        self
    }

    /// Sets the active claim conditions.
    pub fn with_conditions(mut self, conditions: ClaimConditions) -> Self {
        self.state.get_mut().conditions = conditions;
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_claims(&self, fail: bool) {
        self.fail_claims.store(fail, Ordering::SeqCst);
    }

    /// Delays every read and claim by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Delays every read and claim by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        *self.delay.get_mut() = Some(delay);
        self
    }

    /// Number of read calls made so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of claim calls made so far, failed ones included.
    pub fn claim_count(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }

    /// Tokens claimed through this mock, with their recipients.
    pub async fn claims(&self) -> Vec<(Address, TokenId)> {
        self.state.lock().await.claims.clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn begin_read(&self) -> ChainResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ChainError::ContractCall("mock read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DropContract for MockDropContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn claimed_tokens(&self) -> ChainResult<Vec<TokenId>> {
        self.begin_read().await?;
        let claimed = self.state.lock().await.claimed;
        Ok((0..claimed).map(TokenId).collect())
    }

    async fn total_supply(&self) -> ChainResult<u128> {
        self.begin_read().await?;
        Ok(self.state.lock().await.total)
    }

    async fn claim_conditions(&self) -> ChainResult<ClaimConditions> {
        self.begin_read().await?;
        Ok(self.state.lock().await.conditions.clone())
    }

    async fn claim_to(&self, recipient: &Address, quantity: u64) -> ChainResult<Vec<ClaimResult>> {
        let call = self.claim_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_claims.load(Ordering::SeqCst) {
            return Err(ChainError::ContractCall("execution reverted".to_string()));
        }

        let mut state = self.state.lock().await;
        let quantity = u128::from(quantity);
        if state.claimed + quantity > state.total {
            return Err(ChainError::ContractCall("!MaxSupply".to_string()));
        }

        let receipt = TransactionReceipt {
            tx_hash: TxHash(keccak256(&encode_u128(call as u128))),
            block_number: call as u64 + 1,
            status: true,
            logs: Vec::new(),
        };
        let first = state.claimed;
        state.claimed += quantity;

        let results: Vec<ClaimResult> = (first..first + quantity)
            .map(|id| ClaimResult {
                receipt: receipt.clone(),
                token_id: TokenId(id),
            })
            .collect();
        state
            .claims
            .extend(results.iter().map(|r| (*recipient, r.token_id)));
        debug!(recipient = %recipient, quantity, "mock claim");
        Ok(results)
    }

    async fn token_metadata(&self, token_id: TokenId) -> ChainResult<NftMetadata> {
        self.begin_read().await?;
        Ok(NftMetadata {
            name: Some(format!("#{}", token_id)),
            description: None,
            image: None,
            uri: format!("mock://{}/{}", self.address, token_id),
        })
    }
}

/// Connector resolving addresses to registered mock contracts.
#[derive(Debug, Default)]
pub struct MockConnector {
    contracts: HashMap<Address, Arc<MockDropContract>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contract under its own address.
    pub fn with_contract(mut self, contract: Arc<MockDropContract>) -> Self {
        self.contracts.insert(contract.address(), contract);
        self
    }

    pub fn contract(&self, address: &Address) -> Option<Arc<MockDropContract>> {
        self.contracts.get(address).cloned()
    }
}

impl ContractConnector for MockConnector {
    fn connect(&self, address: &Address) -> ChainResult<Arc<dyn DropContract>> {
        match self.contracts.get(address) {
            Some(contract) => Ok(contract.clone() as Arc<dyn DropContract>),
            None => Err(ChainError::ContractCall(format!("no contract at {}", address))),
        }
    }
}
