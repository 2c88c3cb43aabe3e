//! 链上只读访问：`eth_call` / `eth_estimateGas` / `eth_gasPrice`

use crate::common::errors::SdkError;
use crate::common::http_client::build_client;
use crate::common::types::EvmEncodeConfig;
use crate::constants::BlockchainName;
use crate::utils::amount::parse_quantity;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// 只读合约调用，返回原始 ABI 编码结果
    async fn call(&self, blockchain: BlockchainName, to: Address, data: Bytes) -> Result<Bytes, SdkError>;

    async fn estimate_gas(
        &self,
        blockchain: BlockchainName,
        from: Address,
        tx: &EvmEncodeConfig,
    ) -> Result<U256, SdkError>;

    async fn gas_price(&self, blockchain: BlockchainName) -> Result<U256, SdkError>;
}

/// 以类型化的 `SolCall` 调用合约并解码返回值
pub async fn call_contract_method<C: SolCall>(
    reader: &dyn ChainReader,
    blockchain: BlockchainName,
    contract: Address,
    call: &C,
) -> Result<C::Return, SdkError> {
    let output = reader.call(blockchain, contract, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&output)
        .map_err(|e| SdkError::external(format!("decoding {} output from {contract}", C::SIGNATURE), e))
}

/// JSON-RPC 实现，每条链一个节点地址
pub struct RpcChainReader {
    http: Client,
    rpc_urls: HashMap<BlockchainName, String>,
    request_id: AtomicU64,
}

impl RpcChainReader {
    pub fn new(
        rpc_urls: HashMap<BlockchainName, String>,
        timeout_millis: u64,
        proxy_url: Option<&str>,
    ) -> Result<Self, SdkError> {
        Ok(Self {
            http: build_client(timeout_millis, proxy_url)?,
            rpc_urls,
            request_id: AtomicU64::new(1),
        })
    }

    async fn rpc_request(&self, blockchain: BlockchainName, method: &str, params: Value) -> Result<Value, SdkError> {
        let url = self
            .rpc_urls
            .get(&blockchain)
            .ok_or_else(|| SdkError::Config(format!("no RPC url configured for {blockchain}")))?;
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(%blockchain, method, id, "rpc request");

        let context = format!("{method} on {blockchain}");
        let response: Value = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SdkError::external(context.clone(), e))?
            .error_for_status()
            .map_err(|e| SdkError::external(context.clone(), e))?
            .json()
            .await
            .map_err(|e| SdkError::external(context.clone(), e))?;

        if let Some(error) = response.get("error") {
            return Err(rpc_error(context, error));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| SdkError::external(context, "response has no result"))
    }
}

/// JSON-RPC 错误对象：code 3 或 "revert" 字样视为合约 revert，其余（限流、节点故障）为外部错误
fn rpc_error(context: String, error: &Value) -> SdkError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    let code = error.get("code").and_then(Value::as_i64);
    if code == Some(3) || message.to_lowercase().contains("revert") {
        SdkError::reverted(context, message)
    } else {
        SdkError::external(context, message)
    }
}

fn hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn expect_str<'a>(value: &'a Value, method: &str) -> Result<&'a str, SdkError> {
    value
        .as_str()
        .ok_or_else(|| SdkError::external(method.to_string(), format!("expected hex string, got {value}")))
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn call(&self, blockchain: BlockchainName, to: Address, data: Bytes) -> Result<Bytes, SdkError> {
        let params = json!([{ "to": to.to_string(), "data": hex_data(&data) }, "latest"]);
        let result = self.rpc_request(blockchain, "eth_call", params).await?;
        let raw = expect_str(&result, "eth_call")?;
        Bytes::from_str(raw).map_err(|e| SdkError::external("eth_call: invalid hex output", e))
    }

    async fn estimate_gas(
        &self,
        blockchain: BlockchainName,
        from: Address,
        tx: &EvmEncodeConfig,
    ) -> Result<U256, SdkError> {
        let params = json!([{
            "from": from.to_string(),
            "to": tx.to.to_string(),
            "data": hex_data(&tx.data),
            "value": format!("{:#x}", tx.value),
        }]);
        let result = self.rpc_request(blockchain, "eth_estimateGas", params).await?;
        parse_quantity(expect_str(&result, "eth_estimateGas")?)
    }

    async fn gas_price(&self, blockchain: BlockchainName) -> Result<U256, SdkError> {
        let result = self.rpc_request(blockchain, "eth_gasPrice", json!([])).await?;
        parse_quantity(expect_str(&result, "eth_gasPrice")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_rpc_url_is_config_error() {
        let reader = RpcChainReader::new(HashMap::new(), 1_000, None).unwrap();
        let err = reader.gas_price(BlockchainName::Ethereum).await.unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_rpc_error_object_is_revert() {
        let err = rpc_error(
            "eth_call on ETH".to_string(),
            &json!({"code": 3, "message": "execution reverted: UniswapV2Library: INSUFFICIENT_LIQUIDITY"}),
        );
        assert!(err.is_revert());
        assert!(err.to_string().contains("INSUFFICIENT_LIQUIDITY"));

        let limited = rpc_error("eth_call on ETH".to_string(), &json!({"code": -32005, "message": "rate limit exceeded"}));
        assert!(!limited.is_revert());
    }

    #[test]
    fn test_hex_data() {
        assert_eq!(hex_data(&[0x12, 0x34]), "0x1234");
        assert_eq!(hex_data(&[]), "0x");
    }
}
