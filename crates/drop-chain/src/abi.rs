//! Minimal contract ABI encoding.
//!
//! Only what the drop contract needs: function selectors, static 32-byte
//! words, and decoding of `string` return values and static tuple fields.

use sha3::{Digest, Keccak256};

use crate::error::{ChainError, ChainResult};
use crate::types::Address;

/// Size of an ABI word in bytes.
pub const WORD: usize = 32;

/// A single ABI word.
pub type Word = [u8; WORD];

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Topic hash of an event signature.
pub fn event_topic(signature: &str) -> Word {
    keccak256(signature.as_bytes())
}

pub fn encode_address(address: &Address) -> Word {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

pub fn encode_u128(value: u128) -> Word {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// `type(uint256).max`.
pub fn max_uint() -> Word {
    [0xff; WORD]
}

/// Returns word `index` of `data`.
pub fn word_at(data: &[u8], index: usize) -> ChainResult<&[u8]> {
    let start = index
        .checked_mul(WORD)
        .ok_or_else(|| ChainError::AbiDecode(format!("word index {} out of range", index)))?;
    data.get(start..start + WORD).ok_or_else(|| {
        ChainError::AbiDecode(format!(
            "word {} out of range ({} bytes of data)",
            index,
            data.len()
        ))
    })
}

/// Decodes a uint word that must fit in 128 bits.
pub fn word_to_u128(word: &[u8]) -> ChainResult<u128> {
    if word.len() != WORD {
        return Err(ChainError::AbiDecode(format!("word has {} bytes", word.len())));
    }
    if word[..16].iter().any(|b| *b != 0) {
        return Err(ChainError::Overflow(format!("0x{}", hex::encode(word))));
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(bytes))
}

pub fn word_to_u64(word: &[u8]) -> ChainResult<u64> {
    let value = word_to_u128(word)?;
    u64::try_from(value).map_err(|_| ChainError::Overflow(value.to_string()))
}

fn word_to_usize(word: &[u8]) -> ChainResult<usize> {
    let value = word_to_u128(word)?;
    usize::try_from(value).map_err(|_| ChainError::Overflow(value.to_string()))
}

/// Decodes the low 20 bytes of a word.
pub fn word_to_address(word: &[u8]) -> ChainResult<Address> {
    if word.len() != WORD {
        return Err(ChainError::AbiDecode(format!("word has {} bytes", word.len())));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address(bytes))
}

/// Decodes a `string` whose offset sits in head word `head_index`.
///
/// Offsets are relative to the start of `data`.
pub fn decode_string(data: &[u8], head_index: usize) -> ChainResult<String> {
    let offset = word_to_usize(word_at(data, head_index)?)?;
    let len_word = data
        .get(offset..offset + WORD)
        .ok_or_else(|| ChainError::AbiDecode(format!("string offset {} out of range", offset)))?;
    let len = word_to_usize(len_word)?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| ChainError::AbiDecode(format!("string of {} bytes truncated", len)))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ChainError::AbiDecode(format!("string is not UTF-8: {}", e)))
}

/// Returns the body of a returned tuple that contains dynamic members.
///
/// Such tuples are returned behind a single offset word.
pub fn tuple_body(data: &[u8]) -> ChainResult<&[u8]> {
    let offset = word_to_usize(word_at(data, 0)?)?;
    data.get(offset..)
        .ok_or_else(|| ChainError::AbiDecode(format!("tuple offset {} out of range", offset)))
}

/// Builder for call data: selector followed by head words.
#[derive(Debug, Clone)]
pub struct CallData {
    bytes: Vec<u8>,
}

impl CallData {
    pub fn new(signature: &str) -> Self {
        Self {
            bytes: selector(signature).to_vec(),
        }
    }

    pub fn word(mut self, word: Word) -> Self {
        self.bytes.extend_from_slice(&word);
        self
    }

    pub fn address(self, address: &Address) -> Self {
        self.word(encode_address(address))
    }

    pub fn uint(self, value: u128) -> Self {
        self.word(encode_u128(value))
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// `0x`-prefixed hex encoding.
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes `0x`-prefixed hex data. `"0x"` is empty data.
pub fn from_hex_data(s: &str) -> ChainResult<Vec<u8>> {
    let hex_part = s
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("expected hex data, got {}", s)))?;
    hex::decode(hex_part).map_err(|e| ChainError::InvalidResponse(format!("bad hex data: {}", e)))
}

/// Parses a JSON-RPC hex quantity such as `0x1a`.
pub fn parse_quantity(s: &str) -> ChainResult<u128> {
    let hex_part = s
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("expected hex quantity, got {}", s)))?;
    if hex_part.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(hex_part, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("bad quantity {}: {}", s, e)))
}

/// Formats a JSON-RPC hex quantity.
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}
