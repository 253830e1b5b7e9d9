//! Mint view state.

use drop_chain::Address;

/// Phase of the mint workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintPhase {
    /// Supply reads have not finished (or no contract is attached yet).
    LoadingSupply,
    Ready,
    /// A claim is in flight.
    Minting,
    /// Supply reads failed; the message is shown instead of the counts.
    Error(String),
}

/// What the mint button shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintButton {
    Loading,
    SoldOut,
    SignIn,
    Mint { price: String, symbol: String },
    /// Ready and connected but the price is unknown, or reads failed.
    Unavailable,
}

/// Snapshot of everything the mint section renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintState {
    pub phase: MintPhase,
    pub claimed: u64,
    pub total_supply: u128,
    /// Unit price as a decimal string.
    pub price: Option<String>,
    pub currency_symbol: Option<String>,
}

impl Default for MintState {
    fn default() -> Self {
        Self {
            phase: MintPhase::LoadingSupply,
            claimed: 0,
            total_supply: 0,
            price: None,
            currency_symbol: None,
        }
    }
}

impl MintState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while supply is loading or a claim is in flight.
    pub fn loading(&self) -> bool {
        matches!(self.phase, MintPhase::LoadingSupply | MintPhase::Minting)
    }

    pub fn sold_out(&self) -> bool {
        u128::from(self.claimed) == self.total_supply
    }

    /// Whether the mint control is enabled for `address`.
    pub fn can_mint(&self, address: Option<&Address>) -> bool {
        !self.loading() && !self.sold_out() && address.is_some()
    }

    /// Why the mint control is disabled, if it is.
    pub fn blocked_reason(&self, address: Option<&Address>) -> Option<&'static str> {
        if self.loading() {
            Some("loading")
        } else if self.sold_out() {
            Some("sold out")
        } else if address.is_none() {
            Some("no wallet connected")
        } else {
            None
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            MintPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Button to show for `address`.
    pub fn button(&self, address: Option<&Address>) -> MintButton {
        if self.loading() {
            return MintButton::Loading;
        }
        if matches!(self.phase, MintPhase::Error(_)) {
            return MintButton::Unavailable;
        }
        if self.sold_out() {
            return MintButton::SoldOut;
        }
        if address.is_none() {
            return MintButton::SignIn;
        }
        match (&self.price, &self.currency_symbol) {
            (Some(price), Some(symbol)) => MintButton::Mint {
                price: price.clone(),
                symbol: symbol.clone(),
            },
            _ => MintButton::Unavailable,
        }
    }

    /// Moves to `Error`, forgetting the counts.
    pub(crate) fn fail(&mut self, message: String) {
        self.phase = MintPhase::Error(message);
        self.claimed = 0;
        self.total_supply = 0;
        self.price = None;
        self.currency_symbol = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address([0x70; 20])
    }

    fn ready(claimed: u64, total: u128) -> MintState {
        MintState {
            phase: MintPhase::Ready,
            claimed,
            total_supply: total,
            price: Some("0.01".to_string()),
            currency_symbol: Some("ETH".to_string()),
        }
    }

    #[test]
    fn test_default_is_loading() {
        let state = MintState::new();
        assert!(state.loading());
        assert!(!state.can_mint(Some(&address())));
        assert_eq!(state.button(Some(&address())), MintButton::Loading);
    }

    #[test]
    fn test_can_mint_matches_gate() {
        let addr = address();
        let phases = [
            MintPhase::LoadingSupply,
            MintPhase::Ready,
            MintPhase::Minting,
        ];
        for phase in phases {
            for (claimed, total) in [(0u64, 0u128), (13, 21), (21, 21)] {
                for who in [None, Some(&addr)] {
                    let state = MintState {
                        phase: phase.clone(),
                        ..ready(claimed, total)
                    };
                    let disabled =
                        state.loading() || u128::from(claimed) == total || who.is_none();
                    assert_eq!(state.can_mint(who), !disabled, "{:?} {}/{}", phase, claimed, total);
                    assert_eq!(state.blocked_reason(who).is_some(), disabled);
                }
            }
        }
    }

    #[test]
    fn test_buttons() {
        let addr = address();
        assert_eq!(ready(21, 21).button(Some(&addr)), MintButton::SoldOut);
        assert_eq!(ready(13, 21).button(None), MintButton::SignIn);
        assert_eq!(
            ready(13, 21).button(Some(&addr)),
            MintButton::Mint {
                price: "0.01".to_string(),
                symbol: "ETH".to_string()
            }
        );

        let mut no_price = ready(13, 21);
        no_price.price = None;
        assert_eq!(no_price.button(Some(&addr)), MintButton::Unavailable);
    }

    #[test]
    fn test_fail_resets_counts() {
        let mut state = ready(13, 21);
        state.fail("rpc down".to_string());

        assert_eq!(state.error_message(), Some("rpc down"));
        assert_eq!((state.claimed, state.total_supply), (0, 0));
        assert!(state.price.is_none());
        assert!(!state.loading());
        assert!(!state.can_mint(Some(&address())));
        assert_eq!(state.button(Some(&address())), MintButton::Unavailable);
    }
}
