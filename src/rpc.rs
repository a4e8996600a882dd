//! JSON-RPC client for the chain node.
//!
//! The only module that performs network I/O. Everything the crate needs from
//! the node is five methods: `eth_call`, `eth_sendRawTransaction`,
//! `eth_getTransactionReceipt`, `eth_blockNumber` and `eth_getLogs`.

use crate::config::ClientConfig;
use crate::error::{Result, SaccoError};
use crate::retry::RetryStrategy;
use alloy_primitives::{Address, B256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// JSON-RPC request ID type
type RequestId = u64;

/// JSON-RPC node client
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// HTTP client
    client: Client,
    /// Node endpoint URL
    url: String,
    /// Retry strategy
    retry_strategy: RetryStrategy,
    /// Request ID counter
    request_id: Arc<AtomicU64>,
}

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: RequestId,
    method: String,
    params: Value,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: RequestId,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Mined-transaction receipt fields the client cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptInfo {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Block the transaction landed in
    pub block_number: u64,
    /// Whether execution succeeded
    pub succeeded: bool,
}

/// A raw event log entry returned by `eth_getLogs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract
    pub address: Address,
    /// Topic list; `topics[0]` identifies the event
    pub topics: Vec<B256>,
    /// ABI-encoded data payload, 0x-prefixed hex
    pub data: String,
    /// Block the log was emitted in
    pub block_number: u64,
}

/// Parse a 0x-prefixed hex quantity
pub(crate) fn parse_quantity(value: &str) -> Result<u64> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(stripped, 16)
        .map_err(|e| SaccoError::InvalidResponse(format!("bad hex quantity '{}': {}", value, e)))
}

fn parse_hash(value: &str) -> Result<B256> {
    value
        .parse::<B256>()
        .map_err(|e| SaccoError::InvalidResponse(format!("bad hash '{}': {}", value, e)))
}

impl RpcClient {
    /// Create a new node client
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SaccoError::Network)?;

        let retry_strategy = RetryStrategy::from_config(&config);

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            retry_strategy,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    fn next_request_id(&self) -> RequestId {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Make a JSON-RPC call with retry on transient failures
    async fn call_rpc(&self, method: &str, params: Value) -> Result<Value> {
        let request_id = self.next_request_id();

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: request_id,
            method: method.to_string(),
            params,
        };

        debug!("rpc request: {} (id: {})", method, request_id);

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .post(&self.url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(SaccoError::Network)?;

                let status = response.status();
                if !status.is_success() {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "unknown error".to_string());
                    return Err(SaccoError::Node(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }

                let rpc_response: JsonRpcResponse = response
                    .json()
                    .await
                    .map_err(|e| SaccoError::InvalidResponse(e.to_string()))?;

                if let Some(rpc_error) = rpc_response.error {
                    // Contract reverts arrive as error objects; map them to the
                    // user-facing taxonomy so they are never retried
                    if rpc_error.message.to_lowercase().contains("revert") {
                        error!("call reverted: {}", rpc_error.message);
                        return Err(SaccoError::RemoteRejection(rpc_error.message));
                    }
                    error!("rpc error: {} (code: {})", rpc_error.message, rpc_error.code);
                    return Err(SaccoError::Rpc {
                        code: rpc_error.code,
                        message: rpc_error.message,
                    });
                }

                rpc_response
                    .result
                    .ok_or_else(|| SaccoError::InvalidResponse("missing result".to_string()))
            })
            .await
    }

    /// Issue a view call against a contract. Returns the raw return data hex.
    pub async fn call(&self, to: Address, data: &str) -> Result<String> {
        debug!("eth_call to {}", to);

        let params = json!([
            {
                "to": format!("{}", to),
                "data": data,
            },
            "latest"
        ]);

        let result = self.call_rpc("eth_call", params).await?;
        result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| SaccoError::InvalidResponse("eth_call result is not hex".to_string()))
    }

    /// Submit a signed raw transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw_tx: &str) -> Result<B256> {
        info!("submitting raw transaction");

        let result = self
            .call_rpc("eth_sendRawTransaction", json!([raw_tx]))
            .await?;

        let hash = result.as_str().ok_or_else(|| {
            SaccoError::InvalidResponse("missing transaction hash".to_string())
        })?;

        let hash = parse_hash(hash)?;
        info!("transaction submitted: {}", hash);
        Ok(hash)
    }

    /// Fetch the receipt for a transaction, if it is mined yet
    pub async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptInfo>> {
        debug!("fetching receipt for {}", hash);

        let result = self
            .call_rpc("eth_getTransactionReceipt", json!([format!("{}", hash)]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let block_number = result["blockNumber"]
            .as_str()
            .map(parse_quantity)
            .transpose()?
            .ok_or_else(|| {
                SaccoError::InvalidResponse("receipt missing blockNumber".to_string())
            })?;

        let succeeded = match result["status"].as_str() {
            Some(status) => parse_quantity(status)? == 1,
            None => false,
        };

        Ok(Some(ReceiptInfo {
            transaction_hash: hash,
            block_number,
            succeeded,
        }))
    }

    /// Current head block number
    pub async fn block_number(&self) -> Result<u64> {
        let result = self.call_rpc("eth_blockNumber", json!([])).await?;
        let value = result.as_str().ok_or_else(|| {
            SaccoError::InvalidResponse("eth_blockNumber result is not hex".to_string())
        })?;
        parse_quantity(value)
    }

    /// Fetch logs emitted by `address` in the inclusive block range
    pub async fn logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        debug!("fetching logs for {} blocks {}-{}", address, from_block, to_block);

        let params = json!([
            {
                "address": format!("{}", address),
                "fromBlock": format!("0x{:x}", from_block),
                "toBlock": format!("0x{:x}", to_block),
            }
        ]);

        let result = self.call_rpc("eth_getLogs", params).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| SaccoError::InvalidResponse("eth_getLogs result is not an array".to_string()))?;

        let mut logs = Vec::with_capacity(entries.len());
        for entry in entries {
            logs.push(Self::parse_log(entry)?);
        }
        Ok(logs)
    }

    fn parse_log(entry: &Value) -> Result<LogEntry> {
        let address = entry["address"]
            .as_str()
            .ok_or_else(|| SaccoError::InvalidResponse("log missing address".to_string()))?
            .parse::<Address>()
            .map_err(|e| SaccoError::InvalidResponse(format!("bad log address: {}", e)))?;

        let topics = entry["topics"]
            .as_array()
            .ok_or_else(|| SaccoError::InvalidResponse("log missing topics".to_string()))?
            .iter()
            .map(|t| {
                t.as_str()
                    .ok_or_else(|| SaccoError::InvalidResponse("topic is not hex".to_string()))
                    .and_then(parse_hash)
            })
            .collect::<Result<Vec<B256>>>()?;

        let data = entry["data"].as_str().unwrap_or("0x").to_string();

        let block_number = entry["blockNumber"]
            .as_str()
            .map(parse_quantity)
            .transpose()?
            .unwrap_or(0);

        Ok(LogEntry {
            address,
            topics,
            data,
            block_number,
        })
    }

    /// Health check - verify the node responds
    pub async fn health_check(&self) -> Result<bool> {
        debug!("performing node health check");

        match self.block_number().await {
            Ok(block) => {
                info!("node health check passed at block {}", block);
                Ok(true)
            }
            Err(e) => {
                error!("node health check failed: {:?}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Arc<ClientConfig> {
        Arc::new(
            ClientConfig::testnet()
                .with_request_timeout(std::time::Duration::from_secs(10))
                .with_max_retries(1),
        )
    }

    #[test]
    fn test_rpc_client_creation() {
        let client = RpcClient::new(create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_id_increment() {
        let client = RpcClient::new(create_test_config()).unwrap();
        assert_eq!(client.next_request_id(), 1);
        assert_eq!(client.next_request_id(), 2);
        assert_eq!(client.next_request_id(), 3);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x64").unwrap(), 100);
        assert_eq!(parse_quantity("0xff").unwrap(), 255);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_parse_log() {
        let entry = serde_json::json!({
            "address": "0x1111111111111111111111111111111111111111",
            "topics": [
                "0x2222222222222222222222222222222222222222222222222222222222222222"
            ],
            "data": "0xabcdef",
            "blockNumber": "0x10"
        });

        let log = RpcClient::parse_log(&entry).unwrap();
        assert_eq!(log.address, Address::repeat_byte(0x11));
        assert_eq!(log.topics.len(), 1);
        assert_eq!(log.data, "0xabcdef");
        assert_eq!(log.block_number, 16);
    }

    #[test]
    fn test_parse_log_rejects_missing_fields() {
        let entry = serde_json::json!({ "topics": [] });
        assert!(RpcClient::parse_log(&entry).is_err());
    }
}
