//! XY Finance 聚合器 API 的请求 / 响应结构

use super::string_or_number;
use crate::constants::BlockchainName;
use crate::utils::amount::parse_quantity;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

pub const XY_DEX_NAME: &str = "XY_DEX";

pub const XY_SUPPORTED_BLOCKCHAINS: [BlockchainName; 9] = [
    BlockchainName::Ethereum,
    BlockchainName::BinanceSmartChain,
    BlockchainName::Polygon,
    BlockchainName::Avalanche,
    BlockchainName::Fantom,
    BlockchainName::Arbitrum,
    BlockchainName::Optimism,
    BlockchainName::Base,
    BlockchainName::Kava,
];

/// `/quote` 请求参数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyQuoteRequest {
    pub src_chain_id: u64,
    pub src_quote_token_address: String,
    pub src_quote_token_amount: String,
    pub dst_chain_id: u64,
    pub dst_quote_token_address: String,
    /// 百分比，例如 "1" 表示 1%
    pub slippage: String,
}

/// `/buildTx` 请求参数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyBuildTxRequest {
    #[serde(flatten)]
    pub quote: XyQuoteRequest,
    pub receiver: String,
    pub src_swap_provider: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyQuoteResponse {
    pub success: bool,
    #[serde(default)]
    pub routes: Vec<XyRoute>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl XyQuoteResponse {
    /// 目标数量最大的路由
    pub fn best_route(&self) -> Option<&XyRoute> {
        self.routes
            .iter()
            .filter_map(|route| route.destination_amount().map(|amount| (amount, route)))
            .max_by_key(|(amount, _)| *amount)
            .map(|(_, route)| route)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyRoute {
    #[serde(default)]
    pub src_swap_description: Option<XySwapDescription>,
    pub dst_quote_token_amount: String,
    #[serde(default)]
    pub min_receive_amount: Option<String>,
    pub contract_address: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub estimated_gas: Option<String>,
}

impl XyRoute {
    pub fn destination_amount(&self) -> Option<U256> {
        parse_quantity(&self.dst_quote_token_amount).ok()
    }

    pub fn swap_provider(&self) -> Option<&str> {
        self.src_swap_description.as_ref().map(|d| d.provider.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XySwapDescription {
    pub provider: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyBuildTxResponse {
    pub success: bool,
    #[serde(default)]
    pub route: Option<XyBuildTxRoute>,
    #[serde(default)]
    pub tx: Option<XyTransaction>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyBuildTxRoute {
    pub dst_quote_token_amount: String,
    #[serde(default)]
    pub min_receive_amount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XyTransaction {
    pub to: String,
    pub data: String,
    pub value: String,
}

/// 失败响应的可读信息
pub fn xy_error_message(code: Option<&str>, message: Option<&str>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!("{message} (code {code})"),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => format!("error code {code}"),
        (None, None) => "unknown XY error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_best_route_picks_largest_output() {
        let response: XyQuoteResponse = serde_json::from_value(json!({
            "success": true,
            "routes": [
                {"srcSwapDescription": {"provider": "PancakeSwap"}, "dstQuoteTokenAmount": "900", "contractAddress": "0x01", "estimatedGas": 150000},
                {"srcSwapDescription": {"provider": "Biswap"}, "dstQuoteTokenAmount": "1000", "contractAddress": "0x02", "estimatedGas": "170000"},
                {"dstQuoteTokenAmount": "garbage", "contractAddress": "0x03"}
            ]
        }))
        .unwrap();

        let best = response.best_route().unwrap();
        assert_eq!(best.swap_provider(), Some("Biswap"));
        assert_eq!(best.estimated_gas.as_deref(), Some("170000"));
        assert_eq!(response.routes[0].estimated_gas.as_deref(), Some("150000"));
    }

    #[test]
    fn test_build_tx_request_flattens_quote() {
        let request = XyBuildTxRequest {
            quote: XyQuoteRequest {
                src_chain_id: 56,
                src_quote_token_address: "0xa".to_string(),
                src_quote_token_amount: "100".to_string(),
                dst_chain_id: 56,
                dst_quote_token_address: "0xb".to_string(),
                slippage: "1".to_string(),
            },
            receiver: "0xc".to_string(),
            src_swap_provider: "PancakeSwap".to_string(),
        };
        let query = crate::common::http_client::to_query(&request).unwrap();
        assert!(query.contains(&("srcChainId".to_string(), "56".to_string())));
        assert!(query.contains(&("srcSwapProvider".to_string(), "PancakeSwap".to_string())));
        assert!(query.contains(&("receiver".to_string(), "0xc".to_string())));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(xy_error_message(Some("10"), Some("Insufficient liquidity")), "Insufficient liquidity (code 10)");
        assert_eq!(xy_error_message(None, None), "unknown XY error");
    }
}
