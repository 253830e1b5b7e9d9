//! Core on-chain types: addresses, token ids, amounts, claim conditions and
//! transaction receipts.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::contract::DropContract;
use crate::error::{ChainError, ChainResult};

/// Decimals of the native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Symbol shown for native-currency prices.
pub const NATIVE_SYMBOL: &str = "ETH";

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Placeholder address that stands for the native currency in claim conditions.
    pub const NATIVE_TOKEN: Address = Address([0xEE; 20]);

    /// Creates an address from raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Shortened form for display: first 5 and last 5 characters.
    ///
    /// `0x70997970c51812dc3a010c7d01b50e0d17dc79c8` becomes `0x709...c79c8`.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..5], &full[full.len() - 5..])
    }
}

impl FromStr for Address {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ChainError::InvalidAddress(s.to_string()))?;
        if hex_part.len() != 40 {
            return Err(ChainError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|_| ChainError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A token id within a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u128);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| ChainError::InvalidTxHash(s.to_string()))?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|_| ChainError::InvalidTxHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Formats a base-unit amount as a decimal string.
///
/// Trailing fractional zeros are dropped: `10^16` wei with 18 decimals is
/// `"0.01"`, `2 * 10^18` is `"2"`.
pub fn format_units(amount: u128, decimals: u8) -> String {
    // 10^38 is the largest power of ten that fits in a u128.
    let decimals = decimals.min(38);
    let base = 10u128.pow(decimals as u32);
    let whole = amount / base;
    let frac = amount % base;

    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// An amount of some currency, with its display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyValue {
    /// Amount in base units.
    pub value: u128,
    pub decimals: u8,
    pub symbol: String,
    /// `value` formatted with `decimals`.
    pub display_value: String,
}

impl CurrencyValue {
    pub fn new(value: u128, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            value,
            decimals,
            symbol: symbol.into(),
            display_value: format_units(value, decimals),
        }
    }

    /// Native currency amount in wei.
    pub fn native(value: u128) -> Self {
        Self::new(value, NATIVE_DECIMALS, NATIVE_SYMBOL)
    }
}

/// The active claim phase of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConditions {
    /// Unix timestamp at which the phase opens.
    pub start_timestamp: u64,
    /// Cap on tokens claimable in this phase.
    pub max_claimable_supply: u128,
    /// Tokens already claimed in this phase.
    pub supply_claimed: u128,
    /// Per-wallet limit; zero means unlimited for public claims.
    pub quantity_limit_per_wallet: u128,
    /// Allowlist root; all zeros for public claims.
    pub merkle_root: [u8; 32],
    /// Price per token in base units of `currency`.
    pub price: u128,
    /// Currency contract, or [`Address::NATIVE_TOKEN`].
    pub currency: Address,
    pub currency_metadata: CurrencyValue,
}

impl ClaimConditions {
    /// Public claim phase priced in the native currency.
    pub fn native(price: u128) -> Self {
        Self {
            start_timestamp: 0,
            max_claimable_supply: u128::MAX,
            supply_claimed: 0,
            quantity_limit_per_wallet: 0,
            merkle_root: [0u8; 32],
            price,
            currency: Address::NATIVE_TOKEN,
            currency_metadata: CurrencyValue::native(price),
        }
    }

    pub fn is_native(&self) -> bool {
        self.currency == Address::NATIVE_TOKEN
    }
}

/// One log emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `true` if execution succeeded.
    pub status: bool,
    pub logs: Vec<LogEntry>,
}

/// Token metadata document referenced by `tokenURI`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// URI the document was loaded from.
    #[serde(skip)]
    pub uri: String,
}

/// Result of claiming one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResult {
    pub receipt: TransactionReceipt,
    pub token_id: TokenId,
}

impl ClaimResult {
    /// Loads the claimed token's metadata.
    pub async fn metadata(&self, contract: &dyn DropContract) -> ChainResult<NftMetadata> {
        contract.token_metadata(self.token_id).await
    }
}
