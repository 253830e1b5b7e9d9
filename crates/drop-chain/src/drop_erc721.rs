//! On-chain ERC-721 drop contract over JSON-RPC.
//!
//! Targets the common "drop" layout: lazily minted tokens claimed in id
//! order, with a sequence of claim conditions of which one is active.
//!
//! | Read                                 | Meaning                    |
//! |--------------------------------------|----------------------------|
//! | `nextTokenIdToClaim()`               | claimed count              |
//! | `nextTokenIdToMint()`                | total supply               |
//! | `getActiveClaimConditionId()`        | active phase index         |
//! | `getClaimConditionById(uint256)`     | phase price and currency   |
//! | `tokenURI(uint256)`                  | metadata location          |
//!
//! Claims go through `claim(...)` signed by the wallet provider for the
//! recipient; minted ids are read back from the `Transfer` logs.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::abi::{
    decode_string, encode_address, event_topic, max_uint, tuple_body, word_at,
    word_to_address, word_to_u128, word_to_u64, CallData, WORD,
};
use crate::contract::{ContractConnector, DropContract};
use crate::error::{ChainError, ChainResult};
use crate::rpc::JsonRpcClient;
use crate::types::{
    Address, ClaimConditions, ClaimResult, CurrencyValue, NftMetadata, TokenId, TransactionReceipt,
    NATIVE_DECIMALS, NATIVE_SYMBOL,
};

/// Signature of the claim function.
pub const CLAIM_SIGNATURE: &str =
    "claim(address,uint256,address,uint256,(bytes32[],uint256,uint256,address),bytes)";

/// Signature of the ERC-721 transfer event.
pub const TRANSFER_EVENT: &str = "Transfer(address,address,uint256)";

/// Upper bound on claimed tokens enumerated by `claimed_tokens`.
pub const MAX_ENUMERATED_TOKENS: u128 = 1_000_000;

/// Drop contract reached through a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcDropContract {
    rpc: Arc<JsonRpcClient>,
    address: Address,
}

impl RpcDropContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self { rpc, address }
    }

    async fn call(&self, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        self.rpc.eth_call(&self.address, &data).await
    }

    async fn read_uint(&self, signature: &str) -> ChainResult<u128> {
        let data = self.call(CallData::new(signature).finish()).await?;
        word_to_u128(word_at(&data, 0)?)
    }

    async fn currency_metadata(&self, currency: &Address, price: u128) -> ChainResult<CurrencyValue> {
        if *currency == Address::NATIVE_TOKEN {
            return Ok(CurrencyValue::new(price, NATIVE_DECIMALS, NATIVE_SYMBOL));
        }

        let symbol = self
            .rpc
            .eth_call(currency, &CallData::new("symbol()").finish())
            .await?;
        let symbol = decode_string(&symbol, 0)?;
        let decimals = self
            .rpc
            .eth_call(currency, &CallData::new("decimals()").finish())
            .await?;
        let decimals = word_to_u128(word_at(&decimals, 0)?)?;
        let decimals = u8::try_from(decimals).map_err(|_| ChainError::Overflow(decimals.to_string()))?;
        Ok(CurrencyValue::new(price, decimals, symbol))
    }
}

#[async_trait::async_trait]
impl DropContract for RpcDropContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn claimed_tokens(&self) -> ChainResult<Vec<TokenId>> {
        let claimed = self.read_uint("nextTokenIdToClaim()").await?;
        if claimed > MAX_ENUMERATED_TOKENS {
            return Err(ChainError::Overflow(format!(
                "{} claimed tokens exceeds enumeration limit",
                claimed
            )));
        }
        Ok((0..claimed).map(TokenId).collect())
    }

    async fn total_supply(&self) -> ChainResult<u128> {
        self.read_uint("nextTokenIdToMint()").await
    }

    async fn claim_conditions(&self) -> ChainResult<ClaimConditions> {
        let id = self.read_uint("getActiveClaimConditionId()").await?;
        let data = self
            .call(CallData::new("getClaimConditionById(uint256)").uint(id).finish())
            .await?;
        let mut conditions = decode_claim_condition(&data)?;
        conditions.currency_metadata = self
            .currency_metadata(&conditions.currency, conditions.price)
            .await?;
        debug!(
            contract = %self.address,
            condition = id,
            price = %conditions.currency_metadata.display_value,
            symbol = %conditions.currency_metadata.symbol,
            "loaded claim conditions"
        );
        Ok(conditions)
    }

    async fn claim_to(&self, recipient: &Address, quantity: u64) -> ChainResult<Vec<ClaimResult>> {
        let conditions = self.claim_conditions().await?;
        let value = if conditions.is_native() {
            conditions
                .price
                .checked_mul(u128::from(quantity))
                .ok_or_else(|| ChainError::Overflow("claim value".to_string()))?
        } else {
            0
        };

        let data = encode_claim(recipient, quantity, &conditions);
        let hash = self
            .rpc
            .send_transaction(recipient, &self.address, &data, value)
            .await
            .map_err(ChainError::into_wallet_error)?;
        info!(contract = %self.address, tx = %hash, quantity, "claim submitted");

        let receipt = self.rpc.wait_for_receipt(&hash).await?;
        if !receipt.status {
            warn!(tx = %hash, "claim reverted");
            return Err(ChainError::TransactionReverted(hash.to_string()));
        }

        let ids = minted_token_ids(&receipt, &self.address, recipient)?;
        if ids.is_empty() {
            warn!(tx = %hash, "claim receipt has no transfer logs");
        }
        Ok(ids
            .into_iter()
            .map(|token_id| ClaimResult {
                receipt: receipt.clone(),
                token_id,
            })
            .collect())
    }

    async fn token_metadata(&self, token_id: TokenId) -> ChainResult<NftMetadata> {
        let data = self
            .call(CallData::new("tokenURI(uint256)").uint(token_id.0).finish())
            .await?;
        let uri = decode_string(&data, 0)?;
        let document = self.rpc.get_json(&uri).await?;
        let mut metadata: NftMetadata = serde_json::from_value(document)?;
        metadata.uri = uri;
        Ok(metadata)
    }
}

/// Decodes a `getClaimConditionById` return value.
///
/// The struct has a dynamic `metadata` member, so it is returned behind an
/// offset. Currency metadata is filled in for native prices only.
pub fn decode_claim_condition(data: &[u8]) -> ChainResult<ClaimConditions> {
    let body = tuple_body(data)?;
    let merkle_root: [u8; 32] = word_at(body, 4)?
        .try_into()
        .map_err(|_| ChainError::AbiDecode("merkle root".to_string()))?;
    let price = word_to_u128(word_at(body, 5)?)?;
    let currency = word_to_address(word_at(body, 6)?)?;

    Ok(ClaimConditions {
        start_timestamp: word_to_u64(word_at(body, 0)?)?,
        max_claimable_supply: word_to_u128(word_at(body, 1)?).unwrap_or(u128::MAX),
        supply_claimed: word_to_u128(word_at(body, 2)?)?,
        quantity_limit_per_wallet: word_to_u128(word_at(body, 3)?).unwrap_or(u128::MAX),
        merkle_root,
        price,
        currency,
        currency_metadata: CurrencyValue::new(price, NATIVE_DECIMALS, NATIVE_SYMBOL),
    })
}

/// Encodes a public claim of `quantity` tokens at the phase price.
///
/// Head: receiver, quantity, currency, price, proof offset, data offset.
/// The proof is empty with no overrides; the trailing data is empty.
pub fn encode_claim(recipient: &Address, quantity: u64, conditions: &ClaimConditions) -> Vec<u8> {
    const HEAD_WORDS: u128 = 6;
    const PROOF_WORDS: u128 = 5;

    CallData::new(CLAIM_SIGNATURE)
        .address(recipient)
        .uint(u128::from(quantity))
        .address(&conditions.currency)
        .uint(conditions.price)
        .uint(HEAD_WORDS * WORD as u128)
        .uint((HEAD_WORDS + PROOF_WORDS) * WORD as u128)
        // (bytes32[] proof, uint256 quantityLimitPerWallet, uint256 pricePerToken, address currency)
        .uint(4 * WORD as u128)
        .uint(0)
        .word(max_uint())
        .address(&Address::ZERO)
        .uint(0)
        // bytes data
        .uint(0)
        .finish()
}

/// Ids minted to `recipient` by `contract` in a receipt.
pub fn minted_token_ids(
    receipt: &TransactionReceipt,
    contract: &Address,
    recipient: &Address,
) -> ChainResult<Vec<TokenId>> {
    let transfer = event_topic(TRANSFER_EVENT);
    let from_zero = encode_address(&Address::ZERO);
    let to = encode_address(recipient);

    receipt
        .logs
        .iter()
        .filter(|log| {
            log.address == *contract
                && log.topics.len() == 4
                && log.topics[0] == transfer
                && log.topics[1] == from_zero
                && log.topics[2] == to
        })
        .map(|log| word_to_u128(&log.topics[3]).map(TokenId))
        .collect()
}

/// Connector producing [`RpcDropContract`] handles over a shared client.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    rpc: Arc<JsonRpcClient>,
}

impl RpcConnector {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        Self { rpc }
    }
}

impl ContractConnector for RpcConnector {
    fn connect(&self, address: &Address) -> ChainResult<Arc<dyn DropContract>> {
        Ok(Arc::new(RpcDropContract::new(self.rpc.clone(), *address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode_u128;
    use crate::types::{LogEntry, TxHash};

    fn drop_address() -> Address {
        "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap()
    }

    fn recipient() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    fn encode_condition_return(price: u128, currency: &Address) -> Vec<u8> {
        let words = [
            encode_u128(0x20),
            encode_u128(1_650_000_000),
            encode_u128(21),
            encode_u128(13),
            max_uint(),
            [0u8; 32],
            encode_u128(price),
            encode_address(currency),
            encode_u128(0x100),
            encode_u128(0),
        ];
        words.concat()
    }

    fn transfer_log(contract: Address, from: Address, to: Address, id: u128) -> LogEntry {
        LogEntry {
            address: contract,
            topics: vec![
                event_topic(TRANSFER_EVENT),
                encode_address(&from),
                encode_address(&to),
                encode_u128(id),
            ],
            data: Vec::new(),
        }
    }

    #[test]
    fn test_decode_claim_condition() {
        let data = encode_condition_return(10_000_000_000_000_000, &Address::NATIVE_TOKEN);
        let conditions = decode_claim_condition(&data).unwrap();

        assert_eq!(conditions.start_timestamp, 1_650_000_000);
        assert_eq!(conditions.max_claimable_supply, 21);
        assert_eq!(conditions.supply_claimed, 13);
        assert_eq!(conditions.quantity_limit_per_wallet, u128::MAX);
        assert!(conditions.is_native());
        assert_eq!(conditions.currency_metadata.display_value, "0.01");
        assert_eq!(conditions.currency_metadata.symbol, "ETH");
    }

    #[test]
    fn test_decode_claim_condition_truncated() {
        let data = encode_condition_return(1, &Address::NATIVE_TOKEN);
        assert!(matches!(
            decode_claim_condition(&data[..4 * WORD]),
            Err(ChainError::AbiDecode(_))
        ));
    }

    #[test]
    fn test_encode_claim_layout() {
        let conditions = ClaimConditions::native(10_000_000_000_000_000);
        let data = encode_claim(&recipient(), 1, &conditions);

        assert_eq!(&data[..4], &crate::abi::selector(CLAIM_SIGNATURE));
        let args = &data[4..];
        assert_eq!(args.len(), 12 * WORD);
        assert_eq!(word_to_address(word_at(args, 0).unwrap()).unwrap(), recipient());
        assert_eq!(word_to_u128(word_at(args, 1).unwrap()).unwrap(), 1);
        assert_eq!(
            word_to_address(word_at(args, 2).unwrap()).unwrap(),
            Address::NATIVE_TOKEN
        );
        assert_eq!(
            word_to_u128(word_at(args, 3).unwrap()).unwrap(),
            10_000_000_000_000_000
        );
        assert_eq!(word_to_u128(word_at(args, 4).unwrap()).unwrap(), 0xc0);
        assert_eq!(word_to_u128(word_at(args, 5).unwrap()).unwrap(), 0x160);
        assert_eq!(word_to_u128(word_at(args, 6).unwrap()).unwrap(), 0x80);
        assert_eq!(word_at(args, 8).unwrap(), &max_uint()[..]);
        assert_eq!(word_to_u128(word_at(args, 10).unwrap()).unwrap(), 0);
        assert_eq!(word_to_u128(word_at(args, 11).unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_minted_token_ids() {
        let contract = drop_address();
        let other = Address([0x33; 20]);
        let receipt = TransactionReceipt {
            tx_hash: TxHash([1u8; 32]),
            block_number: 7,
            status: true,
            logs: vec![
                transfer_log(contract, Address::ZERO, recipient(), 13),
                // secondary transfer, not a mint
                transfer_log(contract, other, recipient(), 2),
                // mint on another contract
                transfer_log(other, Address::ZERO, recipient(), 99),
                transfer_log(contract, Address::ZERO, other, 14),
                transfer_log(contract, Address::ZERO, recipient(), 15),
            ],
        };

        let ids = minted_token_ids(&receipt, &contract, &recipient()).unwrap();
        assert_eq!(ids, vec![TokenId(13), TokenId(15)]);
    }
}
