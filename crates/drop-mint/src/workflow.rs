//! The mint workflow state machine.
//!
//! One [`MintWorkflow`] backs one mounted drop view:
//!
//! ```text
//! LoadingSupply --load ok--> Ready --mint--> Minting --done/failed--> Ready
//!       |
//!       +--load failed--> Error
//! ```
//!
//! Supply loads race the view's cancellation token; once the view is torn
//! down nothing is written to its state. Wallet sign-in and sign-out go
//! through the injected [`WalletSession`] and never touch the mint state.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use drop_chain::{Address, MockDropContract, MockWallet};
//! use drop_mint::{MintConfig, MintWorkflow, RecordingNotifier};
//!
//! # async fn example() -> drop_mint::MintResult<()> {
//! let contract = Arc::new(MockDropContract::new(Address([0x5f; 20])).with_supply(13, 21));
//! let wallet = Arc::new(MockWallet::connected(Address([0x70; 20])));
//! let workflow = MintWorkflow::new(wallet, Arc::new(RecordingNotifier::new()), MintConfig::default());
//!
//! workflow.attach_contract(contract).await;
//! workflow.load_supply().await?;
//! assert_eq!(workflow.snapshot().await.claimed, 13);
//!
//! let minted = workflow.mint().await?;
//! assert_eq!(minted.len(), 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use drop_chain::{Address, ChainError, ClaimResult, DropContract, WalletSession};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{MintConfig, RefreshPolicy};
use crate::error::{MintError, MintResult};
use crate::notify::{NotificationKind, Notifier};
use crate::state::{MintPhase, MintState};

/// Supply figures read from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Supply {
    claimed: u64,
    total: u128,
    price: String,
    symbol: String,
}

async fn fetch_supply(contract: &dyn DropContract) -> Result<Supply, ChainError> {
    let claimed = contract.claimed_tokens().await?.len() as u64;
    let total = contract.total_supply().await?;
    let conditions = contract.claim_conditions().await?;

    if u128::from(claimed) > total {
        return Err(ChainError::InvalidResponse(format!(
            "claimed count {} exceeds total supply {}",
            claimed, total
        )));
    }

    Ok(Supply {
        claimed,
        total,
        price: conditions.currency_metadata.display_value,
        symbol: conditions.currency_metadata.symbol,
    })
}

impl Supply {
    fn apply(self, state: &mut MintState) {
        state.claimed = self.claimed;
        state.total_supply = self.total;
        state.price = Some(self.price);
        state.currency_symbol = Some(self.symbol);
    }
}

/// Mint workflow for one mounted drop view.
pub struct MintWorkflow {
    contract: RwLock<Option<Arc<dyn DropContract>>>,
    wallet: Arc<dyn WalletSession>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<MintState>>,
    cancel_token: CancellationToken,
    config: MintConfig,
}

impl std::fmt::Debug for MintWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintWorkflow")
            .field("torn_down", &self.cancel_token.is_cancelled())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MintWorkflow {
    /// Creates a workflow in `LoadingSupply` with no contract attached.
    pub fn new(
        wallet: Arc<dyn WalletSession>,
        notifier: Arc<dyn Notifier>,
        config: MintConfig,
    ) -> Self {
        Self {
            contract: RwLock::new(None),
            wallet,
            notifier,
            state: Arc::new(RwLock::new(MintState::new())),
            cancel_token: CancellationToken::new(),
            config,
        }
    }

    /// Makes the contract handle available for reads and claims.
    pub async fn attach_contract(&self, contract: Arc<dyn DropContract>) {
        debug!(contract = %contract.address(), "contract attached");
        *self.contract.write().await = Some(contract);
    }

    async fn contract(&self) -> Option<Arc<dyn DropContract>> {
        self.contract.read().await.clone()
    }

    pub async fn has_contract(&self) -> bool {
        self.contract.read().await.is_some()
    }

    /// Reads claimed tokens, total supply and claim conditions.
    ///
    /// Returns `Ok(false)` without a contract. On failure the state moves to
    /// [`MintPhase::Error`] with the counts reset. Results arriving after
    /// [`teardown`](Self::teardown) are dropped with [`MintError::Cancelled`].
    pub async fn load_supply(&self) -> MintResult<bool> {
        self.run_load(false).await
    }

    /// Loads the supply again for a reloaded page.
    ///
    /// Skipped with `Ok(false)` while a load or a mint is in flight. The
    /// previous counts stay visible until the new ones arrive; an `Error`
    /// view recovers once the reads succeed.
    pub async fn reload_supply(&self) -> MintResult<bool> {
        self.run_load(true).await
    }

    async fn run_load(&self, skip_if_loading: bool) -> MintResult<bool> {
        let Some(contract) = self.contract().await else {
            debug!("no contract yet, supply stays loading");
            return Ok(false);
        };
        if self.cancel_token.is_cancelled() {
            return Err(MintError::Cancelled);
        }

        {
            let mut state = self.state.write().await;
            match state.phase {
                MintPhase::Minting => {
                    debug!("mint in flight, supply load skipped");
                    return Ok(false);
                }
                MintPhase::LoadingSupply if skip_if_loading => {
                    debug!("supply load already running");
                    return Ok(false);
                }
                _ => state.phase = MintPhase::LoadingSupply,
            }
        }

        let result = tokio::select! {
            _ = self.cancel_token.cancelled() => return Err(MintError::Cancelled),
            result = fetch_supply(contract.as_ref()) => result,
        };

        let mut state = self.state.write().await;
        if self.cancel_token.is_cancelled() {
            return Err(MintError::Cancelled);
        }

        match result {
            Ok(supply) => {
                info!(
                    contract = %contract.address(),
                    claimed = supply.claimed,
                    total = %supply.total,
                    price = %supply.price,
                    "supply loaded"
                );
                supply.apply(&mut state);
                state.phase = MintPhase::Ready;
                Ok(true)
            }
            Err(e) => {
                error!(contract = %contract.address(), error = %e, "failed to load supply");
                state.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Claims the configured quantity for the connected wallet.
    ///
    /// Rejected with [`MintError::NotAllowed`] while the control is disabled
    /// and with [`MintError::AlreadyMinting`] while another claim is in
    /// flight. Either way the workflow ends back in `Ready`.
    pub async fn mint(&self) -> MintResult<Vec<ClaimResult>> {
        let address = self.wallet.current_address().await;
        let contract = self.contract().await;

        let (recipient, contract) = {
            let mut state = self.state.write().await;
            if state.phase == MintPhase::Minting {
                return Err(MintError::AlreadyMinting);
            }
            if let Some(reason) = state.blocked_reason(address.as_ref()) {
                return Err(MintError::NotAllowed(reason.to_string()));
            }
            let (Some(recipient), Some(contract)) = (address, contract) else {
                return Err(MintError::NoContract);
            };
            state.phase = MintPhase::Minting;
            (recipient, contract)
        };

        let messages = &self.config.messages;
        let progress = self
            .notifier
            .notify(NotificationKind::Loading, &messages.in_progress);
        info!(contract = %contract.address(), recipient = %recipient, "minting");

        let outcome = contract.claim_to(&recipient, self.config.quantity).await;

        match outcome {
            Ok(results) => {
                self.notifier
                    .notify(NotificationKind::Success, &messages.success);
                self.notifier.dismiss(progress);
                for result in &results {
                    info!(
                        token_id = %result.token_id,
                        tx = %result.receipt.tx_hash,
                        "token minted"
                    );
                }

                self.refresh_after_mint(contract.as_ref(), &recipient, results.len())
                    .await;
                self.finish_minting().await;
                Ok(results)
            }
            Err(e) => {
                error!(contract = %contract.address(), error = %e, "mint failed");
                self.notifier
                    .notify(NotificationKind::Error, &messages.failure);
                self.notifier.dismiss(progress);
                self.finish_minting().await;
                Err(e.into())
            }
        }
    }

    async fn finish_minting(&self) {
        let mut state = self.state.write().await;
        if state.phase == MintPhase::Minting {
            state.phase = MintPhase::Ready;
        }
    }

    async fn refresh_after_mint(&self, contract: &dyn DropContract, recipient: &Address, minted: usize) {
        if self.cancel_token.is_cancelled() {
            return;
        }

        match self.config.refresh_after_mint {
            RefreshPolicy::Never => {}
            RefreshPolicy::Optimistic => {
                let mut state = self.state.write().await;
                let claimed = state.claimed.saturating_add(minted as u64);
                state.claimed = match u64::try_from(state.total_supply) {
                    Ok(total) => claimed.min(total),
                    Err(_) => claimed,
                };
            }
            RefreshPolicy::Refetch => {
                let result = tokio::select! {
                    _ = self.cancel_token.cancelled() => return,
                    result = fetch_supply(contract) => result,
                };
                match result {
                    Ok(supply) => {
                        let mut state = self.state.write().await;
                        if !self.cancel_token.is_cancelled() {
                            supply.apply(&mut state);
                        }
                    }
                    Err(e) => {
                        warn!(recipient = %recipient, error = %e, "supply refresh after mint failed");
                    }
                }
            }
        }
    }

    /// Signs out if a wallet is connected, otherwise signs in.
    ///
    /// Returns the connected address afterwards. Never touches the mint state.
    pub async fn toggle_session(&self) -> MintResult<Option<Address>> {
        match self.wallet.current_address().await {
            Some(address) => {
                self.wallet.disconnect().await?;
                debug!(address = %address, "signed out");
                Ok(None)
            }
            None => match self.wallet.connect().await {
                Ok(address) => {
                    debug!(address = %address, "signed in");
                    Ok(Some(address))
                }
                Err(e) => {
                    warn!(error = %e, "sign in failed");
                    Err(e.into())
                }
            },
        }
    }

    /// Cancels pending loads; later results are discarded.
    pub fn teardown(&self) {
        if !self.cancel_token.is_cancelled() {
            debug!("mint view torn down");
            self.cancel_token.cancel();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> MintState {
        self.state.read().await.clone()
    }

    /// Address of the connected wallet.
    pub async fn current_address(&self) -> Option<Address> {
        self.wallet.current_address().await
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }
}

impl Drop for MintWorkflow {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
