//! JSON-RPC client for the chain node and the wallet provider.
//!
//! The wallet provider is any endpoint that answers `eth_requestAccounts`
//! and signs `eth_sendTransaction` for its accounts; a local development
//! node does both.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::abi::{from_hex_data, parse_quantity, to_hex_data, to_quantity};
use crate::error::{ChainError, ChainResult};
use crate::types::{Address, LogEntry, TransactionReceipt, TxHash};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default time to wait for a transaction to be mined.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default gateway for `ipfs://` URIs.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Configuration for [`JsonRpcClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// Endpoint URL.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Interval between receipt polls.
    pub poll_interval: Duration,
    /// Time to wait for a receipt before giving up.
    pub receipt_timeout: Duration,
    /// Gateway prefix substituted for `ipfs://`.
    pub ipfs_gateway: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
        }
    }
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    pub fn with_ipfs_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.ipfs_gateway = gateway.into();
        self
    }

    /// Rewrites `ipfs://` URIs to the gateway; other URIs pass through.
    pub fn resolve_uri(&self, uri: &str) -> String {
        match uri.strip_prefix("ipfs://") {
            Some(path) => format!(
                "{}/{}",
                self.ipfs_gateway.trim_end_matches('/'),
                path.trim_start_matches("ipfs/")
            ),
            None => uri.to_string(),
        }
    }
}

/// A JSON-RPC 2.0 client over HTTP.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: RpcConfig) -> ChainResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Sends a request and returns its `result`.
    pub async fn call(&self, method: &str, params: Value) -> ChainResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "rpc request");

        let response = self.http.post(&self.config.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() && text.trim().is_empty() {
            return Err(ChainError::InvalidResponse(format!("HTTP {}", status)));
        }

        parse_rpc_response(&text, id)
    }

    /// `eth_call` against the latest block.
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> ChainResult<Vec<u8>> {
        let result = self
            .call(
                "eth_call",
                json!([{ "to": to, "data": to_hex_data(data) }, "latest"]),
            )
            .await?;
        let hex = result
            .as_str()
            .ok_or_else(|| ChainError::InvalidResponse("eth_call result is not a string".into()))?;
        from_hex_data(hex)
    }

    /// `eth_sendTransaction`; the endpoint signs for `from`.
    pub async fn send_transaction(
        &self,
        from: &Address,
        to: &Address,
        data: &[u8],
        value: u128,
    ) -> ChainResult<TxHash> {
        let result = self
            .call(
                "eth_sendTransaction",
                json!([{
                    "from": from,
                    "to": to,
                    "data": to_hex_data(data),
                    "value": to_quantity(value),
                }]),
            )
            .await?;
        let hash = result.as_str().ok_or_else(|| {
            ChainError::InvalidResponse("eth_sendTransaction result is not a string".into())
        })?;
        hash.parse()
    }

    /// Receipt of a transaction, or `None` while it is pending.
    pub async fn transaction_receipt(&self, hash: &TxHash) -> ChainResult<Option<TransactionReceipt>> {
        let result = self
            .call("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        parse_receipt(&result).map(Some)
    }

    /// Polls until the transaction is mined or the receipt timeout elapses.
    pub async fn wait_for_receipt(&self, hash: &TxHash) -> ChainResult<TransactionReceipt> {
        match tokio::time::timeout(self.config.receipt_timeout, self.poll_receipt(hash)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::ReceiptTimeout(hash.to_string())),
        }
    }

    async fn poll_receipt(&self, hash: &TxHash) -> ChainResult<TransactionReceipt> {
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            trace!(tx = %hash, "receipt pending");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetches a JSON document, resolving `ipfs://` through the gateway.
    pub async fn get_json(&self, uri: &str) -> ChainResult<Value> {
        let url = self.config.resolve_uri(uri);
        debug!(url = %url, "fetching document");
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Extracts `result` from a JSON-RPC response, or its error object.
pub fn parse_rpc_response(body: &str, expected_id: u64) -> ChainResult<Value> {
    let mut value: Value = serde_json::from_str(body)?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ChainError::Rpc { code, message });
    }

    if let Some(id) = value.get("id").and_then(Value::as_u64)
        && id != expected_id
    {
        return Err(ChainError::InvalidResponse(format!(
            "response id {} does not match request id {}",
            id, expected_id
        )));
    }

    value
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ChainError::InvalidResponse("response has no `result` member".into()))
}

fn str_field<'a>(value: &'a Value, field: &str) -> ChainResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::InvalidResponse(format!("missing field `{}`", field)))
}

fn parse_word(s: &str) -> ChainResult<[u8; 32]> {
    let bytes = from_hex_data(s)?;
    bytes
        .try_into()
        .map_err(|_| ChainError::InvalidResponse(format!("topic is not 32 bytes: {}", s)))
}

/// Parses an `eth_getTransactionReceipt` result.
pub fn parse_receipt(value: &Value) -> ChainResult<TransactionReceipt> {
    let tx_hash = str_field(value, "transactionHash")?.parse()?;
    let block_number = parse_quantity(str_field(value, "blockNumber")?)?;
    let block_number = u64::try_from(block_number)
        .map_err(|_| ChainError::Overflow(block_number.to_string()))?;
    let status = parse_quantity(str_field(value, "status")?)? == 1;

    let mut logs = Vec::new();
    for log in value.get("logs").and_then(Value::as_array).into_iter().flatten() {
        let topics = log
            .get("topics")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|t| {
                t.as_str()
                    .ok_or_else(|| ChainError::InvalidResponse("topic is not a string".into()))
                    .and_then(parse_word)
            })
            .collect::<ChainResult<Vec<_>>>()?;

        logs.push(LogEntry {
            address: str_field(log, "address")?.parse()?,
            topics,
            data: from_hex_data(str_field(log, "data")?)?,
        });
    }

    Ok(TransactionReceipt {
        tx_hash,
        block_number,
        status,
        logs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpc_response() {
        let result = parse_rpc_response(r#"{"jsonrpc":"2.0","id":3,"result":"0x01"}"#, 3).unwrap();
        assert_eq!(result, json!("0x01"));

        let result = parse_rpc_response(r#"{"jsonrpc":"2.0","id":3,"result":null}"#, 3).unwrap();
        assert!(result.is_null());
    }

    #[test]
    fn test_parse_rpc_error() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#;
        match parse_rpc_response(body, 1) {
            Err(ChainError::Rpc { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "execution reverted");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rpc_id_mismatch() {
        assert!(matches!(
            parse_rpc_response(r#"{"jsonrpc":"2.0","id":9,"result":"0x"}"#, 1),
            Err(ChainError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_rpc_response(r#"{"jsonrpc":"2.0","id":1}"#, 1),
            Err(ChainError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_receipt() {
        let hash = format!("0x{}", "ab".repeat(32));
        let topic = format!("0x{}", "00".repeat(32));
        let receipt = parse_receipt(&json!({
            "transactionHash": hash,
            "blockNumber": "0x10",
            "status": "0x1",
            "logs": [{
                "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "topics": [topic],
                "data": "0x"
            }]
        }))
        .unwrap();

        assert_eq!(receipt.tx_hash.to_string(), hash);
        assert_eq!(receipt.block_number, 16);
        assert!(receipt.status);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].topics[0], [0u8; 32]);
    }

    #[test]
    fn test_parse_receipt_reverted() {
        let receipt = parse_receipt(&json!({
            "transactionHash": format!("0x{}", "01".repeat(32)),
            "blockNumber": "0x1",
            "status": "0x0",
            "logs": []
        }))
        .unwrap();
        assert!(!receipt.status);
        assert!(parse_receipt(&json!({"status": "0x1"})).is_err());
    }

    #[test]
    fn test_resolve_uri() {
        let config = RpcConfig::default();
        assert_eq!(
            config.resolve_uri("ipfs://QmHash/0"),
            "https://ipfs.io/ipfs/QmHash/0"
        );
        assert_eq!(
            config.resolve_uri("ipfs://ipfs/QmHash/0"),
            "https://ipfs.io/ipfs/QmHash/0"
        );
        assert_eq!(
            config.resolve_uri("https://example.com/1.json"),
            "https://example.com/1.json"
        );

        let config = config.with_ipfs_gateway("http://127.0.0.1:8080/ipfs");
        assert_eq!(config.resolve_uri("ipfs://Qm/1"), "http://127.0.0.1:8080/ipfs/Qm/1");
    }

    #[test]
    fn test_config_builders() {
        let config = RpcConfig::new("http://node:8545")
            .with_timeout(Duration::from_secs(3))
            .with_poll_interval(Duration::from_millis(50))
            .with_receipt_timeout(Duration::from_secs(5));
        assert_eq!(config.url, "http://node:8545");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.receipt_timeout, Duration::from_secs(5));
    }
}
